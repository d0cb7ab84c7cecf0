use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use stiletto::Markers;

use crate::StdError;

/// Layered JSON configuration, one entry per section.
///
/// A base file is merged with any number of override files. Each top-level key
/// is a section that is read back as a typed value, either by name with
/// [`Config::get`] or through its [`ConfigSection`] with [`Config::section`].
///
/// # Examples
///
/// ```rust
/// use stiletto::Markers;
/// use stiletto_cli::Config;
///
/// let mut config = Config::parse(r#"{"markers": {"nullable": ["Nullable"]}}"#).unwrap();
/// config
///     .merge_from(Config::parse(r#"{"markers": {"nullable": ["CheckForNull"]}}"#).unwrap())
///     .unwrap();
/// let markers: Markers = config.section().unwrap();
/// assert_eq!(markers.nullable, ["Nullable", "CheckForNull"]);
/// assert_eq!(markers.module, Markers::default().module);
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(flatten)]
    pub(crate) configs: BTreeMap<String, serde_json::Value>,
}

/// A typed section of the [`Config`].
pub trait ConfigSection: DeserializeOwned {
    /// Top-level key holding the section.
    fn key() -> &'static str;
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deserializes the entry `name`, reading an absent entry as `null`.
    pub fn get<T>(&self, name: impl AsRef<str>) -> Result<T, StdError>
    where
        T: DeserializeOwned,
    {
        Ok(serde_json::from_value(
            self.configs
                .get(name.as_ref())
                .cloned()
                .unwrap_or(serde_json::Value::Null),
        )?)
    }

    /// Reads a section, falling back to its default when absent.
    pub fn section<T>(&self) -> Result<T, StdError>
    where
        T: ConfigSection + Default,
    {
        Ok(self.get::<Option<T>>(T::key())?.unwrap_or_default())
    }

    /// Replaces the entry `name` with the serialized `value`.
    pub fn set<T>(&mut self, name: impl Into<String>, value: T) -> Result<(), StdError>
    where
        T: Serialize,
    {
        self.configs
            .insert(name.into(), serde_json::to_value(value)?);
        Ok(())
    }

    pub fn with<T>(mut self, name: impl Into<String>, value: T) -> Result<Self, StdError>
    where
        T: Serialize,
    {
        self.set(name, value)?;
        Ok(self)
    }

    /// Merges `other` into `self`.
    ///
    /// Objects are merged key by key, arrays are concatenated and any other
    /// value is replaced.
    pub fn merge_from(&mut self, other: Self) -> Result<(), StdError> {
        for (key, value) in other.configs {
            let entry = self.configs.entry(key);
            merge_json_from(entry.or_insert(serde_json::Value::Null), value)?;
        }
        Ok(())
    }

    /// Parses a JSON object.
    pub fn parse<T>(text: T) -> Result<Self, StdError>
    where
        T: AsRef<str>,
    {
        Ok(serde_json::from_str(text.as_ref())?)
    }

    pub async fn parse_file(path: impl AsRef<Path>) -> Result<Self, StdError> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|err| format!("Cannot read config {}: {err}", path.display()))?;
        Self::parse(text)
    }

    /// Loads the base config, if any, then applies every override in order.
    ///
    /// # Arguments
    ///
    /// * `path` - Optional base configuration file
    /// * `overrides` - Files merged on top of the base, in order
    ///
    /// # Returns
    ///
    /// The merged configuration, or an empty one when neither a base nor any
    /// override is given.
    ///
    /// # Errors
    ///
    /// Fails with "Cannot read config ..." if a file cannot be read, or with
    /// the JSON error if a file is not a JSON object.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use stiletto_cli::{Config, OutputConfig};
    ///
    /// # async fn example() -> Result<(), stiletto_cli::StdError> {
    /// let config = Config::load(Some("stiletto.json"), ["local.json"]).await?;
    /// let output: OutputConfig = config.section()?;
    /// println!("{:?}", output.directory);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn load<P, I>(path: Option<P>, overrides: I) -> Result<Self, StdError>
    where
        P: AsRef<Path>,
        I: IntoIterator,
        I::Item: AsRef<Path>,
    {
        let mut config = match path {
            Some(v) => Self::parse_file(v).await?,
            None => Self::new(),
        };
        for path in overrides {
            let config_override = Self::parse_file(path).await?;
            config.merge_from(config_override)?;
        }
        Ok(config)
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    /// The whole configuration as one JSON object.
    pub fn to_json_pretty(&self) -> Result<String, StdError> {
        Ok(serde_json::to_string_pretty(&self.configs)?)
    }
}

fn merge_json_from(lhs: &mut serde_json::Value, rhs: serde_json::Value) -> Result<(), StdError> {
    match lhs {
        serde_json::Value::Object(l) => match rhs {
            serde_json::Value::Object(r) => {
                for (key, value) in r {
                    let entry = l.entry(key);
                    merge_json_from(entry.or_insert(serde_json::Value::Null), value)?;
                }
            }
            _ => *lhs = rhs,
        },
        serde_json::Value::Array(l) => match rhs {
            serde_json::Value::Array(r) => {
                l.extend(r);
            }
            _ => *lhs = rhs,
        },
        _ => *lhs = rhs,
    }
    Ok(())
}

impl ConfigSection for Markers {
    fn key() -> &'static str {
        "markers"
    }
}

/// Where generated sources go.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

impl ConfigSection for OutputConfig {
    fn key() -> &'static str {
        "output"
    }
}
