//! Writes the service's YAML configuration before each launch.

use serde_yaml::{Mapping, Value};
use std::path::{Path, PathBuf};
use tracing::debug;
use winery_common::{Result, ServiceUrls, SupervisorError};

/// Template shipped with the launcher.
pub const DEFAULT_TEMPLATE: &str = include_str!("../resources/winery.yml");

const REPOSITORY_ROOT: &[&str] = &["repository", "repositoryRoot"];
const TOPOLOGY_MODELER: &[&str] = &["ui", "endpoints", "topologymodeler"];
const REPOSITORY_API_URL: &[&str] = &["ui", "endpoints", "repositoryApiUrl"];
const REPOSITORY_UI_URL: &[&str] = &["ui", "endpoints", "repositoryUiUrl"];

/// Where the configuration template comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    Builtin,
    File(PathBuf),
}

/// Produces `winery.yml` from a template with the launch-specific fields
/// filled in. Every other field of the template is carried over untouched.
#[derive(Debug, Clone)]
pub struct ConfigMaterializer {
    template: TemplateSource,
    target: PathBuf,
}

impl ConfigMaterializer {
    pub fn new(template: TemplateSource, target: impl Into<PathBuf>) -> Self {
        Self {
            template,
            target: target.into(),
        }
    }

    /// Write the configuration for a service on `port` serving
    /// `repository_path`, replacing any previous file.
    pub fn materialize(&self, port: u16, repository_path: &Path) -> Result<PathBuf> {
        let template = self.load_template()?;
        let document = render(template, port, repository_path)
            .map_err(|reason| SupervisorError::config_write(&self.target, reason))?;

        let content = serde_yaml::to_string(&document)
            .map_err(|e| SupervisorError::config_write(&self.target, e))?;

        if let Some(parent) = self.target.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| SupervisorError::config_write(parent, e))?;
        }
        std::fs::write(&self.target, content)
            .map_err(|e| SupervisorError::config_write(&self.target, e))?;

        debug!(path = %self.target.display(), port, "Service configuration written");
        Ok(self.target.clone())
    }

    fn load_template(&self) -> Result<Value> {
        let content = match &self.template {
            TemplateSource::Builtin => DEFAULT_TEMPLATE.to_string(),
            TemplateSource::File(path) => std::fs::read_to_string(path)
                .map_err(|e| SupervisorError::config_write(path, e))?,
        };

        let source = match &self.template {
            TemplateSource::Builtin => self.target.as_path(),
            TemplateSource::File(path) => path.as_path(),
        };
        serde_yaml::from_str(&content).map_err(|e| SupervisorError::config_write(source, e))
    }
}

/// Fill the launch-specific fields into `template`.
pub fn render(mut template: Value, port: u16, repository_path: &Path) -> std::result::Result<Value, String> {
    let urls = ServiceUrls::for_port(port);

    set_field(
        &mut template,
        REPOSITORY_ROOT,
        Value::from(repository_path.display().to_string()),
    )?;
    set_field(&mut template, TOPOLOGY_MODELER, Value::from(urls.topology_modeler))?;
    set_field(&mut template, REPOSITORY_API_URL, Value::from(urls.api))?;
    set_field(&mut template, REPOSITORY_UI_URL, Value::from(urls.ui))?;

    Ok(template)
}

/// Set `path` inside `root`, creating missing (or empty) mappings on the way.
fn set_field(root: &mut Value, path: &[&str], value: Value) -> std::result::Result<(), String> {
    let Some((last, parents)) = path.split_last() else {
        return Err("empty field path".to_string());
    };

    let mut node = root;
    for key in parents {
        if node.is_null() {
            *node = Value::Mapping(Mapping::new());
        }
        let mapping = node
            .as_mapping_mut()
            .ok_or_else(|| format!("`{}` cannot be set: parent is not a mapping", path.join(".")))?;
        node = mapping
            .entry(Value::from(*key))
            .or_insert(Value::Null);
    }

    if node.is_null() {
        *node = Value::Mapping(Mapping::new());
    }
    let mapping = node
        .as_mapping_mut()
        .ok_or_else(|| format!("`{}` cannot be set: parent is not a mapping", path.join(".")))?;
    mapping.insert(Value::from(*last), value);
    Ok(())
}
