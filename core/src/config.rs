use std::fmt::{Debug, Formatter};
use std::net::IpAddr;

use http::Uri;
use ini::Ini;
use log::debug;

use crate::command::ResolveEndpoint;
use crate::constants::*;
use crate::request::UserAgent;
use crate::utils::Redact;
use crate::{Context, Credential, Endpoint, Error, Result};

/// Config for aws compatible services.
#[derive(Clone)]
pub struct Config {
    /// `config_file` will be loaded from:
    ///
    /// - env value: `AWS_CONFIG_FILE`
    /// - default to: `~/.aws/config`
    pub config_file: String,
    /// `credentials_file` will be loaded from:
    ///
    /// - env value: `AWS_CREDENTIAL_PROFILES_FILE`
    /// - default to: `~/.aws/credentials`
    pub credentials_file: String,
    /// `profile` will be loaded from:
    ///
    /// - env value: `AWS_DEFAULT_PROFILE`
    /// - default to: `default`
    pub profile: String,

    /// `region` will be loaded from:
    ///
    /// - this field if it's `is_some`
    /// - env value: `AWS_DEFAULT_REGION`
    /// - profile config: `region`
    /// - default to: `us-east-1`
    pub region: Option<String>,
    /// `endpoint` is a url such as `http://127.0.0.1:9000` that replaces the
    /// service endpoint table. It will be loaded from:
    ///
    /// - this field if it's `is_some`
    /// - env value: `AWS_ENDPOINT`
    /// - profile config: `endpoint`
    pub endpoint: Option<String>,
    /// `access_key_id` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: `AWS_ACCESS_KEY_ID` or `AWS_ACCESS_KEY`
    /// - profile config: `aws_access_key_id`
    pub access_key_id: Option<String>,
    /// `secret_access_key` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: `AWS_SECRET_ACCESS_KEY` or `AWS_SECRET_KEY`
    /// - profile config: `aws_secret_access_key`
    pub secret_access_key: Option<String>,

    /// `user_agent` will be loaded from:
    ///
    /// - env value: `AWSNANO_USER_AGENT`, an empty value disables the header
    /// - default to: `awsnano/<version>`
    pub user_agent: UserAgent,
    /// Treat a configured endpoint on `localhost` or a loopback address as a
    /// local test server: path style addressing and no content hash.
    ///
    /// - env value: `AWSNANO_DETECT_LOCAL_ENDPOINT`, `false` disables it
    /// - default to: `true`
    pub detect_local_endpoint: bool,
    /// Overrides whether buckets are addressed as sub-domains.
    pub allow_sub_domains: Option<bool>,
    /// Overrides whether requests carry `x-amz-content-sha256`.
    pub require_content_hash: Option<bool>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_file: "~/.aws/config".to_string(),
            credentials_file: "~/.aws/credentials".to_string(),
            profile: DEFAULT_PROFILE.to_string(),
            region: None,
            endpoint: None,
            access_key_id: None,
            secret_access_key: None,
            user_agent: UserAgent::Default,
            detect_local_endpoint: true,
            allow_sub_domains: None,
            require_content_hash: None,
        }
    }
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("config_file", &self.config_file)
            .field("credentials_file", &self.credentials_file)
            .field("profile", &self.profile)
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .field("access_key_id", &Redact::from(&self.access_key_id))
            .field("secret_access_key", &Redact::from(&self.secret_access_key))
            .field("user_agent", &self.user_agent)
            .field("detect_local_endpoint", &self.detect_local_endpoint)
            .field("allow_sub_domains", &self.allow_sub_domains)
            .field("require_content_hash", &self.require_content_hash)
            .finish()
    }
}

/// Values read from one profile.
#[derive(Default)]
struct Profile {
    region: Option<String>,
    endpoint: Option<String>,
    access_key_id: Option<String>,
    secret_access_key: Option<String>,
}

impl Profile {
    fn merge(&mut self, props: &ini::Properties) {
        let fields = [
            ("region", &mut self.region),
            ("endpoint", &mut self.endpoint),
            ("aws_access_key_id", &mut self.access_key_id),
            ("aws_secret_access_key", &mut self.secret_access_key),
        ];
        for (key, field) in fields {
            if let Some(v) = props.get(key) {
                *field = Some(v.to_string());
            }
        }
    }
}

impl Config {
    /// Load everything: env first, then the profile files for whatever the
    /// env left unset.
    pub async fn load(ctx: &Context) -> Result<Self> {
        Self::default().from_env(ctx).from_profile(ctx).await
    }

    /// Load config from env.
    pub fn from_env(mut self, ctx: &Context) -> Self {
        let envs = ctx.env_vars();
        let get = |keys: &[&str]| keys.iter().find_map(|k| envs.get(*k).cloned());

        if let Some(v) = get(&[AWS_CONFIG_FILE]) {
            self.config_file = v;
        }
        if let Some(v) = get(&[AWS_CREDENTIAL_PROFILES_FILE]) {
            self.credentials_file = v;
        }
        if let Some(v) = get(&[AWS_DEFAULT_PROFILE]) {
            self.profile = v;
        }
        if let Some(v) = get(&[AWS_DEFAULT_REGION]) {
            self.region = Some(v);
        }
        if let Some(v) = get(&[AWS_ENDPOINT]) {
            self.endpoint = Some(v);
        }
        if let Some(v) = get(&[AWS_ACCESS_KEY_ID, AWS_ACCESS_KEY]) {
            self.access_key_id = Some(v);
        }
        if let Some(v) = get(&[AWS_SECRET_ACCESS_KEY, AWS_SECRET_KEY]) {
            self.secret_access_key = Some(v);
        }
        if let Some(v) = get(&[AWSNANO_USER_AGENT]) {
            self.user_agent = if v.is_empty() {
                UserAgent::Disabled
            } else {
                UserAgent::Custom(v)
            };
        }
        if let Some(v) = get(&[AWSNANO_DETECT_LOCAL_ENDPOINT]) {
            self.detect_local_endpoint = !v.eq_ignore_ascii_case("false");
        }
        self
    }

    /// Load config from the profile files.
    ///
    /// Values from the credentials file win over the config file. Fields
    /// that are already set are kept. Missing files are skipped.
    pub async fn from_profile(mut self, ctx: &Context) -> Result<Self> {
        let mut profile = Profile::default();

        let section = match self.profile.as_str() {
            DEFAULT_PROFILE => DEFAULT_PROFILE.to_string(),
            x => format!("profile {x}"),
        };
        if let Some(conf) = load_ini(ctx, &self.config_file).await? {
            match conf.section(Some(section.as_str())) {
                Some(props) => profile.merge(props),
                None => debug!("section {section} not found in config file"),
            }
        }
        if let Some(conf) = load_ini(ctx, &self.credentials_file).await? {
            match conf.section(Some(self.profile.as_str())) {
                Some(props) => profile.merge(props),
                None => debug!("profile {} not found in credentials file", self.profile),
            }
        }

        self.region = self.region.or(profile.region);
        self.endpoint = self.endpoint.or(profile.endpoint);
        self.access_key_id = self.access_key_id.or(profile.access_key_id);
        self.secret_access_key = self.secret_access_key.or(profile.secret_access_key);
        Ok(self)
    }

    /// The region requests are signed for.
    pub fn region(&self) -> &str {
        self.region.as_deref().unwrap_or(DEFAULT_REGION)
    }

    /// The configured credential, if both keys are set.
    pub fn credential(&self) -> Option<Credential> {
        match (&self.access_key_id, &self.secret_access_key) {
            (Some(ak), Some(sk)) => Some(Credential::new(ak, sk)),
            _ => None,
        }
    }

    /// Resolve the endpoint for the resolver's service.
    ///
    /// A configured endpoint url wins over the resolver.
    pub fn endpoint(&self, resolver: &dyn ResolveEndpoint) -> Result<Endpoint> {
        let region = self.region();
        let endpoint = match &self.endpoint {
            Some(url) => {
                let local = self.detect_local_endpoint && is_local_endpoint(url)?;
                if local {
                    debug!("endpoint {url} is local, using path style without content hash");
                }
                Endpoint::from_url(region, url, !local, !local)?
            }
            None => resolver.endpoint(region).ok_or_else(|| {
                Error::config_invalid(format!(
                    "region {region} is not supported by {}",
                    resolver.service_name()
                ))
            })?,
        };

        let allow_sub_domains = self
            .allow_sub_domains
            .unwrap_or(endpoint.allow_sub_domains());
        let require_content_hash = self
            .require_content_hash
            .unwrap_or(endpoint.require_content_hash());
        Ok(endpoint.with_flags(allow_sub_domains, require_content_hash))
    }
}

async fn load_ini(ctx: &Context, path: &str) -> Result<Option<Ini>> {
    let Some(path) = ctx.expand_home_dir(path) else {
        debug!("failed to expand homedir for path: {path}");
        return Ok(None);
    };

    let content = match ctx.file_read(&path).await {
        Ok(content) => content,
        Err(err) => {
            debug!("failed to read profile file {path}: {err:?}");
            return Ok(None);
        }
    };

    let conf = Ini::load_from_str(&String::from_utf8_lossy(&content)).map_err(|e| {
        Error::config_invalid(format!("failed to parse profile file {path}"))
            .with_source(anyhow::Error::new(e))
    })?;
    Ok(Some(conf))
}

fn is_local_endpoint(url: &str) -> Result<bool> {
    let uri: Uri = url.parse()?;
    let Some(host) = uri.host() else {
        return Ok(false);
    };
    let host = host.trim_start_matches('[').trim_end_matches(']');
    Ok(host.eq_ignore_ascii_case("localhost")
        || host.parse::<IpAddr>().is_ok_and(|ip| ip.is_loopback()))
}
