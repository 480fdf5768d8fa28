use std::{io, path::Path, path::PathBuf};

use serde_json::{Map, Value, to_string_pretty};

use crate::{analysers::Analyser, header::AudioFormat};

/// Path of the JSON report: the audio file name with `.json` appended.
pub fn json_path(audio: &Path) -> PathBuf {
    let mut name = audio.as_os_str().to_owned();
    name.push(".json");
    PathBuf::from(name)
}

/// Collects the `json()` contributions of `analysers` under one object,
/// alongside the file format.
pub fn build_json(format: &AudioFormat, analysers: &[&dyn Analyser]) -> Value {
    let mut json_output = Map::new();
    json_output.insert(
        "format".to_string(),
        serde_json::to_value(format).unwrap_or(Value::Null),
    );

    for analyser in analysers.iter() {
        if let Some((key, value)) = analyser.json() {
            json_output.insert(key, value);
        }
    }

    Value::Object(json_output)
}

pub fn write_json(path: &Path, value: &Value) -> io::Result<()> {
    let text = to_string_pretty(value).map_err(io::Error::other)?;
    std::fs::write(path, text)
}
