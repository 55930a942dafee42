// src/cli/call.rs
// One-shot API client for the shell

use std::error::Error;
use std::path::PathBuf;

use clap::Args;

use crate::api::{ApiClient, RequestEnvelope, RequestMethod, SpriteSheetForm};
use crate::settings::ServiceSettings;

#[derive(Args)]
pub struct CallArgs {
    /// Action to invoke: saveSpriteSheet, saveSpriteName, or getAllSpriteNames
    pub action: String,

    /// Acting user; defaults to the OS username
    #[arg(long)]
    pub user: Option<String>,

    /// Page title selecting the sheet
    #[arg(long)]
    pub title: Option<String>,

    /// Numeric sheet id; skips title resolution
    #[arg(long)]
    pub sheet_id: Option<i64>,

    /// Sheet grid columns (saveSpriteSheet)
    #[arg(long)]
    pub columns: Option<i64>,

    /// Sheet grid rows (saveSpriteSheet)
    #[arg(long)]
    pub rows: Option<i64>,

    /// Cell inset in pixels (saveSpriteSheet)
    #[arg(long)]
    pub inset: Option<i64>,

    /// Region name (saveSpriteName)
    #[arg(long)]
    pub name: Option<String>,

    /// Region kind: sprite or slice (saveSpriteName)
    #[arg(long)]
    pub kind: Option<String>,

    /// Region geometry as JSON, e.g. '{"xPos":1,"yPos":0}'
    #[arg(long)]
    pub values: Option<String>,

    /// Send as GET; requests are sent as POST by default
    #[arg(long)]
    pub get: bool,

    /// Unix socket of the server
    #[arg(long)]
    pub socket: Option<PathBuf>,

    /// TCP address of the server
    #[arg(long, conflicts_with = "socket")]
    pub connect: Option<String>,
}

pub fn run(args: CallArgs) -> Result<(), Box<dyn Error>> {
    let settings = ServiceSettings::load_or_default();
    let request = build_request(&args)?;
    let endpoint = super::resolve_endpoint(args.socket, args.connect, &settings);

    let client = ApiClient::new(endpoint);
    let response = client.send(&request)?;

    println!("{}", serde_json::to_string_pretty(&response)?);
    if !response.success {
        std::process::exit(1);
    }
    Ok(())
}

fn build_request(args: &CallArgs) -> Result<RequestEnvelope, Box<dyn Error>> {
    let values = match &args.values {
        Some(raw) => Some(
            serde_json::from_str(raw).map_err(|e| format!("--values is not valid JSON: {}", e))?,
        ),
        None => None,
    };

    let form = SpriteSheetForm {
        spritesheet_id: args.sheet_id.unwrap_or(0),
        page_title: args.title.clone().unwrap_or_default(),
        sprite_columns: args.columns.unwrap_or(0),
        sprite_rows: args.rows.unwrap_or(0),
        sprite_inset: args.inset.unwrap_or(0),
        sprite_name: args.name.clone().unwrap_or_default(),
    };

    let method = if args.get {
        RequestMethod::Get
    } else {
        RequestMethod::Post
    };

    Ok(RequestEnvelope {
        action: args.action.clone(),
        method,
        user: Some(args.user.clone().unwrap_or_else(whoami::username)),
        form: Some(serde_json::to_value(&form)?),
        kind: args.kind.clone(),
        values,
        spritesheet_id: args.sheet_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare_args(action: &str) -> CallArgs {
        CallArgs {
            action: action.to_string(),
            user: None,
            title: None,
            sheet_id: None,
            columns: None,
            rows: None,
            inset: None,
            name: None,
            kind: None,
            values: None,
            get: false,
            socket: None,
            connect: None,
        }
    }

    #[test]
    fn request_defaults_to_post_with_the_os_user() {
        let request = build_request(&bare_args("saveSpriteSheet")).unwrap();
        assert_eq!(request.action, "saveSpriteSheet");
        assert_eq!(request.method, RequestMethod::Post);
        assert_eq!(request.user.as_deref(), Some(whoami::username().as_str()));
    }

    #[test]
    fn flags_land_in_the_form_and_envelope() {
        let mut args = bare_args("saveSpriteName");
        args.user = Some("alexia".to_string());
        args.title = Some("Icons.png".to_string());
        args.name = Some("coin".to_string());
        args.kind = Some("sprite".to_string());
        args.values = Some(r#"{"xPos":1,"yPos":0}"#.to_string());

        let request = build_request(&args).unwrap();
        assert_eq!(request.user.as_deref(), Some("alexia"));
        assert_eq!(request.kind.as_deref(), Some("sprite"));
        assert_eq!(request.values.unwrap()["xPos"], 1);

        let form = request.form.unwrap();
        assert_eq!(form["page_title"], "Icons.png");
        assert_eq!(form["sprite_name"], "coin");
        assert_eq!(form["spritesheet_id"], 0);
    }

    #[test]
    fn malformed_values_are_rejected_client_side() {
        let mut args = bare_args("saveSpriteName");
        args.values = Some("{not json".to_string());
        let err = build_request(&args).unwrap_err();
        assert!(err.to_string().contains("--values"));
    }

    #[test]
    fn get_flag_downgrades_the_method() {
        let mut args = bare_args("getAllSpriteNames");
        args.get = true;
        args.sheet_id = Some(4);
        let request = build_request(&args).unwrap();
        assert_eq!(request.method, RequestMethod::Get);
        assert_eq!(request.spritesheet_id, Some(4));
    }
}
