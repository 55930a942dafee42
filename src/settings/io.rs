use directories_next::ProjectDirs;
use std::fs;
use std::io::{self, BufReader, BufWriter, ErrorKind};
use std::path::PathBuf;
use tracing::{debug, error, info};

const QUALIFIER: &str = "org";
const ORGANIZATION: &str = "SpriteDB";
const APPLICATION: &str = "spritedb";
const CONFIG_FILE: &str = "service_settings.json";

pub(crate) fn config_file_path() -> io::Result<PathBuf> {
    if let Some(proj_dirs) = ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION) {
        let config_dir = proj_dirs.config_dir();
        fs::create_dir_all(config_dir)?;
        Ok(config_dir.join(CONFIG_FILE))
    } else {
        Err(io::Error::new(
            io::ErrorKind::NotFound,
            "Could not determine project directories for service settings.",
        ))
    }
}

pub fn load_settings_from_file<T: for<'de> serde::de::Deserialize<'de> + Default>() -> io::Result<T> {
    let config_file = config_file_path()?;
    debug!("Settings: attempting to load from {:?}", config_file);
    match fs::File::open(&config_file) {
        Ok(file) => {
            let reader = BufReader::new(file);
            match serde_json::from_reader(reader) {
                Ok(settings) => Ok(settings),
                Err(e) => {
                    error!("Settings: failed to parse {:?}: {}", &config_file, e);
                    Err(io::Error::new(
                        ErrorKind::InvalidData,
                        format!("Failed to parse settings file: {}", e),
                    ))
                }
            }
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!("Settings: no file at {:?}, using defaults.", config_file);
            Ok(Default::default())
        }
        Err(e) => {
            error!("Settings: failed to open {:?}: {}", &config_file, e);
            Err(e)
        }
    }
}

pub fn save_settings_to_file<T: serde::Serialize>(settings: &T) -> io::Result<()> {
    let config_file = config_file_path()?;
    info!("Settings: saving to {:?}", config_file);
    let file = fs::File::create(&config_file)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, settings).map_err(|e| {
        error!("Settings: failed to serialize to {:?}: {}", &config_file, e);
        io::Error::new(io::ErrorKind::Other, e)
    })?;
    Ok(())
}
