use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::client::ClientConfig;
use crate::error::{Error, Result};
use crate::util::parse_bool;

pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Default)]
struct RcConfig {
    catalog_url: Option<String>,
    use_https: Option<String>,
    verify: Option<String>,
    timeout: Option<String>,
}

pub(crate) fn load_config(
    catalog_url: Option<String>,
    use_https: Option<bool>,
    verify: Option<bool>,
) -> Result<ClientConfig> {
    let env = |name: &str| std::env::var(name).ok();
    let candidates = rc_candidates(&env);
    load_config_with(catalog_url, use_https, verify, env, &candidates)
}

fn load_config_with<E>(
    catalog_url: Option<String>,
    use_https: Option<bool>,
    verify: Option<bool>,
    env: E,
    rc_candidates: &[PathBuf],
) -> Result<ClientConfig>
where
    E: Fn(&str) -> Option<String>,
{
    let mut catalog_url = catalog_url.or_else(|| env("CBSODATA_CATALOG_URL"));
    let mut use_https = match use_https {
        Some(v) => Some(v),
        None => env_bool(&env, "CBSODATA_USE_HTTPS")?,
    };
    let mut verify = match verify {
        Some(v) => Some(v),
        None => env_bool(&env, "CBSODATA_VERIFY")?,
    };
    let mut timeout = match env("CBSODATA_TIMEOUT") {
        Some(v) => Some(parse_timeout("CBSODATA_TIMEOUT", &v)?),
        None => None,
    };

    if catalog_url.is_none() || use_https.is_none() || verify.is_none() || timeout.is_none() {
        for rc_path in rc_candidates {
            if rc_path.exists() {
                let cfg = read_rc(rc_path)?;
                log::debug!("using configuration file {}", rc_path.display());

                if catalog_url.is_none() {
                    catalog_url = cfg.catalog_url;
                }
                if use_https.is_none() {
                    use_https = rc_bool(rc_path, "use_https", cfg.use_https)?;
                }
                if verify.is_none() {
                    verify = rc_bool(rc_path, "verify", cfg.verify)?;
                }
                if timeout.is_none() {
                    if let Some(v) = cfg.timeout {
                        timeout = Some(parse_timeout("timeout", &v)?);
                    }
                }
                break;
            }
        }
    }

    let catalog_url = catalog_url.filter(|c| !c.trim().is_empty());

    Ok(ClientConfig {
        catalog_url,
        use_https: use_https.unwrap_or(true),
        verify: verify.unwrap_or(true),
        timeout: timeout.unwrap_or(DEFAULT_TIMEOUT),
    })
}

fn env_bool<E>(env: &E, name: &str) -> Result<Option<bool>>
where
    E: Fn(&str) -> Option<String>,
{
    match env(name) {
        Some(v) => parse_bool(&v)
            .map(Some)
            .ok_or_else(|| Error::Config(format!("{} must be a boolean, got '{}'", name, v))),
        None => Ok(None),
    }
}

fn rc_bool(path: &Path, key: &str, value: Option<String>) -> Result<Option<bool>> {
    match value {
        Some(v) => parse_bool(&v).map(Some).ok_or_else(|| {
            Error::Config(format!(
                "`{}` in {} must be a boolean, got '{}'",
                key,
                path.display(),
                v
            ))
        }),
        None => Ok(None),
    }
}

fn parse_timeout(name: &str, value: &str) -> Result<Duration> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|secs| secs.is_finite() && *secs > 0.0)
        .map(Duration::from_secs_f64)
        .ok_or_else(|| {
            Error::Config(format!(
                "{} must be a positive number of seconds, got '{}'",
                name, value
            ))
        })
}

fn read_rc(path: &Path) -> Result<RcConfig> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!(
            "failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;
    let mut cfg = RcConfig::default();

    // A key may be left empty with its value on the next line.
    let mut pending_key: Option<String> = None;

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(pk) = pending_key.take() {
            // Continuation value line. URLs with a scheme contain a colon too.
            if !line.contains(':') || line.contains("://") {
                cfg.set(&pk, strip_quotes(line));
                continue;
            }
        }

        if let Some((k, v)) = line.split_once(':') {
            let k = k.trim();
            let v = strip_quotes(v.trim());
            if v.is_empty() {
                pending_key = Some(k.to_string());
            } else {
                cfg.set(k, v);
            }
        }
    }

    Ok(cfg)
}

impl RcConfig {
    fn set(&mut self, key: &str, value: &str) {
        let value = Some(value.to_string());
        match key {
            "catalog_url" | "url" => self.catalog_url = value,
            "use_https" => self.use_https = value,
            "verify" => self.verify = value,
            "timeout" => self.timeout = value,
            _ => log::debug!("ignoring unknown configuration key '{}'", key),
        }
    }
}

fn strip_quotes(s: &str) -> &str {
    let s = s.trim();
    if (s.starts_with('"') && s.ends_with('"') && s.len() >= 2)
        || (s.starts_with('\'') && s.ends_with('\'') && s.len() >= 2)
    {
        &s[1..s.len() - 1]
    } else {
        s
    }
}

fn rc_candidates<E>(env: &E) -> Vec<PathBuf>
where
    E: Fn(&str) -> Option<String>,
{
    // 1) CBSODATA_RC (explicit)
    // 2) ./.cbsodatarc
    // 3) ~/.cbsodatarc
    if let Some(p) = env("CBSODATA_RC") {
        return vec![PathBuf::from(p)];
    }

    let mut v = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        v.push(cwd.join(".cbsodatarc"));
    }
    if let Some(home) = dirs::home_dir() {
        v.push(home.join(".cbsodatarc"));
    }
    v
}
