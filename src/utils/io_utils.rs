use std::path::{PathBuf, Path};

pub fn save_json_to_config<T: serde::Serialize>(
    obj:       &T,
    conf_name: &str
) -> anyhow::Result<()> {
    let file_name = get_app_conf_file_name(conf_name, true)?;
    save_json_to_file(obj, &file_name)
}

pub fn load_json_from_config_file<T: serde::de::DeserializeOwned>(
    obj:       &mut T,
    conf_name: &str
) -> anyhow::Result<()> {
    let file_name = get_app_conf_file_name(conf_name, false)?;
    load_json_from_file(obj, &file_name)
}

pub fn save_json_to_file<T: serde::Serialize>(obj: &T, file_name: &Path) -> anyhow::Result<()> {
    let text = serde_json::to_string_pretty(obj)?;
    std::fs::write(file_name, text)?;
    Ok(())
}

/// Leaves `obj` untouched if file doesn't exist
pub fn load_json_from_file<T: serde::de::DeserializeOwned>(
    obj:       &mut T,
    file_name: &Path
) -> anyhow::Result<()> {
    if !file_name.is_file() { return Ok(()); }
    let file = std::io::BufReader::new(std::fs::File::open(file_name)?);
    *obj = serde_json::from_reader(file)
        .map_err(|e| anyhow::anyhow!("{}: {}", file_name.display(), e))?;
    Ok(())
}

pub fn get_app_dir() -> anyhow::Result<PathBuf> {
    let conf_dir = dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("dirs::config_dir()"))?;
    let mut path = PathBuf::from(&conf_dir);
    path.push(format!(".{}", env!("CARGO_PKG_NAME")));
    Ok(path)
}

fn get_app_conf_file_name(
    conf_name:  &str,
    create_dir: bool
) -> anyhow::Result<PathBuf> {
    let mut path = get_app_dir()?;
    if create_dir && !path.exists() {
        std::fs::create_dir_all(&path)?;
    }
    path.push(format!("{}.json", conf_name));
    Ok(path)
}

#[test]
fn test_json_file() {
    use crate::options::Options;

    let file_name = std::env::temp_dir()
        .join(format!("{}_test_{}.json", env!("CARGO_PKG_NAME"), std::process::id()));

    let mut options = Options::default();
    load_json_from_file(&mut options, &file_name).unwrap();
    assert_eq!(options, Options::default());

    options.site.latitude = 48.85;
    options.refresh.interval_ms = 500;
    save_json_to_file(&options, &file_name).unwrap();

    let mut loaded = Options::default();
    load_json_from_file(&mut loaded, &file_name).unwrap();
    assert_eq!(loaded, options);

    std::fs::write(&file_name, "{ broken").unwrap();
    assert!(load_json_from_file(&mut loaded, &file_name).is_err());

    _ = std::fs::remove_file(&file_name);
}
