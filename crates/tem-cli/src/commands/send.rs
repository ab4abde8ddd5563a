use std::path::PathBuf;

use clap::Args;
use colored::Colorize;
use tem_core::settings::{CORE_SETTINGS_PREFIXES, DEFAULT_FROM_EMAIL, EMAIL_BACKEND};
use tem_core::{Attachment, BackendRegistry, EmailMessage, Settings};
use tem_scaleway::config::{
    API_KEY_SETTING, API_URL_SETTING, PROJECT_ID_SETTING, REGION_SETTING, SETTINGS_PREFIX,
};
use tem_scaleway::{build_payload, ScalewayPlugin};
use tracing::{debug, info};

/// Project id shown in dry runs when none is configured
const PLACEHOLDER_PROJECT_ID: &str = "<project-id>";

fn parse_header(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", raw))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("header name missing in '{}'", raw));
    }
    Ok((key.to_string(), value.trim().to_string()))
}

#[derive(Args, Debug)]
pub struct SendCommand {
    /// Sender address, optionally as "Name <address>"
    #[arg(long, env = "DEFAULT_FROM_EMAIL")]
    pub from: String,

    /// Primary recipient (repeatable)
    #[arg(long, required = true)]
    pub to: Vec<String>,

    /// Carbon copy recipient (repeatable)
    #[arg(long)]
    pub cc: Vec<String>,

    /// Blind carbon copy recipient (repeatable)
    #[arg(long)]
    pub bcc: Vec<String>,

    /// Reply-To address (repeatable)
    #[arg(long)]
    pub reply_to: Vec<String>,

    /// Extra header as KEY=VALUE (repeatable)
    #[arg(long = "header", value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    #[arg(long)]
    pub subject: String,

    /// Plain text body
    #[arg(long)]
    pub body: String,

    /// HTML alternative of the body
    #[arg(long)]
    pub html: Option<String>,

    /// File to attach (repeatable); the content type is guessed from the extension
    #[arg(long = "attach")]
    pub attachments: Vec<PathBuf>,

    /// Backend name
    #[arg(long, env = "EMAIL_BACKEND", default_value = "scaleway")]
    pub backend: String,

    #[arg(long, env = "SCALEWAY_EMAIL_PROJECT_ID")]
    pub project_id: Option<String>,

    #[arg(long, env = "SCALEWAY_EMAIL_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Override the emails endpoint
    #[arg(long, env = "SCALEWAY_EMAIL_API_URL")]
    pub api_url: Option<String>,

    #[arg(long, env = "SCALEWAY_EMAIL_REGION")]
    pub region: Option<String>,

    /// Report failures as "nothing sent" instead of an error
    #[arg(long)]
    pub fail_silently: bool,

    /// Print the Scaleway request body instead of sending
    #[arg(long)]
    pub dry_run: bool,
}

impl SendCommand {
    /// Environment settings overlaid with the command-line values
    pub fn settings(&self) -> Settings {
        let prefixes: Vec<&str> = CORE_SETTINGS_PREFIXES
            .iter()
            .copied()
            .chain(std::iter::once(SETTINGS_PREFIX))
            .collect();
        let mut settings = Settings::from_env_prefixed(&prefixes);

        settings.set(EMAIL_BACKEND, &self.backend);
        settings.set(DEFAULT_FROM_EMAIL, &self.from);

        let overrides = [
            (PROJECT_ID_SETTING, &self.project_id),
            (API_KEY_SETTING, &self.api_key),
            (API_URL_SETTING, &self.api_url),
            (REGION_SETTING, &self.region),
        ];
        for (key, value) in overrides {
            if let Some(value) = value {
                settings.set(key, value);
            }
        }

        settings
    }

    pub async fn message(&self) -> anyhow::Result<EmailMessage> {
        let mut message = EmailMessage::new(
            &self.subject,
            &self.body,
            &self.from,
            self.to.iter().cloned(),
        );
        message.cc = self.cc.clone();
        message.bcc = self.bcc.clone();
        message.reply_to = self.reply_to.clone();
        message.extra_headers = self.headers.iter().cloned().collect();

        if let Some(html) = &self.html {
            message = message.attach_alternative(html, "text/html");
        }

        for path in &self.attachments {
            debug!("Attaching {}", path.display());
            message = message.attach(Attachment::from_path(path).await?);
        }

        Ok(message)
    }

    async fn run(self) -> anyhow::Result<()> {
        let settings = self.settings();
        let message = self.message().await?;

        if self.dry_run {
            let project_id = settings
                .get(PROJECT_ID_SETTING)
                .unwrap_or(PLACEHOLDER_PROJECT_ID);
            let payload = build_payload(&message, project_id)?;
            println!("{}", serde_json::to_string_pretty(&payload)?);
            return Ok(());
        }

        let mut registry = BackendRegistry::with_defaults();
        registry.register_plugin(&ScalewayPlugin::new());

        let backend = registry.get_connection(&settings, self.fail_silently)?;
        info!("Sending \"{}\" via {}", message.subject, backend.name());

        match backend.send_messages(std::slice::from_ref(&message)).await? {
            Some(sent) => println!(
                "{} {}",
                "✅ Sent to".bright_green(),
                format!("{} recipient(s)", sent).bright_white().bold()
            ),
            None => println!("{}", "⚠️  Nothing was sent".bright_yellow()),
        }

        Ok(())
    }

    pub fn execute(self) -> anyhow::Result<()> {
        let rt = tokio::runtime::Runtime::new()?;
        rt.block_on(self.run())
    }
}
