use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::config::{get_config_path, validate_config, Config, SearchType};
use crate::pipeline::Locale;

/// Line-oriented prompter over any reader/writer pair.
struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    /// Prompt user with a message and return their trimmed input.
    fn prompt(&mut self, message: &str) -> Result<String> {
        write!(self.output, "{}", message).context("Failed to write prompt")?;
        self.output.flush().context("Failed to flush stdout")?;
        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .context("Failed to read input")?;
        if read == 0 {
            anyhow::bail!("Input closed before the wizard finished");
        }
        Ok(line.trim().to_string())
    }

    /// Prompt with a default value. Returns default if input is empty.
    fn prompt_with_default(&mut self, message: &str, default: &str) -> Result<String> {
        let input = self.prompt(&format!("{} [{}]: ", message, default))?;
        if input.is_empty() {
            Ok(default.to_string())
        } else {
            Ok(input)
        }
    }

    /// Prompt with a yes/no question. Returns bool based on input and default.
    fn prompt_yes_no(&mut self, message: &str, default_yes: bool) -> Result<bool> {
        let hint = if default_yes { "Y/n" } else { "y/N" };
        let input = self.prompt(&format!("{} [{}]: ", message, hint))?.to_lowercase();
        if input.is_empty() {
            Ok(default_yes)
        } else {
            Ok(input == "y" || input == "yes")
        }
    }

    fn say(&mut self, text: &str) -> Result<()> {
        writeln!(self.output, "{}", text).context("Failed to write output")
    }
}

fn parse_search_type(s: &str) -> Option<SearchType> {
    match s.trim().to_lowercase().as_str() {
        "projects" | "p" => Some(SearchType::Projects),
        "repositories" | "repos" | "r" => Some(SearchType::Repositories),
        "mypullrequests" | "mine" | "m" => Some(SearchType::MyPullRequests),
        _ => None,
    }
}

fn search_type_name(search_type: SearchType) -> &'static str {
    match search_type {
        SearchType::Projects => "projects",
        SearchType::Repositories => "repositories",
        SearchType::MyPullRequests => "mine",
    }
}

/// Ask every question and build the resulting config.
fn ask_config<R: BufRead, W: Write>(p: &mut Prompter<R, W>, base: &Config) -> Result<Config> {
    let organization = loop {
        let default = base.organization.clone().unwrap_or_default();
        let org = if default.is_empty() {
            p.prompt("Organization (the NAME in dev.azure.com/NAME): ")?
        } else {
            p.prompt_with_default("Organization", &default)?
        };
        if org.is_empty() {
            p.say("  Organization is required.")?;
        } else if org.contains('/') {
            p.say("  Enter only the organization name, not the URL.")?;
        } else {
            break org;
        }
    };

    p.say("")?;
    p.say("Leave the project empty to start from the project list.")?;
    let project = p.prompt_with_default("Project", base.project.as_deref().unwrap_or(""))?;
    let project = if project.is_empty() { None } else { Some(project) };

    let search_type = loop {
        let input = p.prompt_with_default(
            "Start view (projects, repositories, mine)",
            search_type_name(base.search_type),
        )?;
        match parse_search_type(&input) {
            Some(t) if t.requires_project() && project.is_none() => {
                p.say("  That view needs a project. Choose projects, or restart and set a project.")?;
            }
            Some(t) => break t,
            None => p.say("  Invalid: choose projects, repositories or mine.")?,
        }
    };

    let locale = loop {
        let input = p.prompt_with_default("Language (pt-BR, en)", &base.locale.to_string())?;
        match Locale::parse(&input) {
            Some(l) => break l,
            None => p.say("  Invalid: choose pt-BR or en.")?,
        }
    };

    let timeout = loop {
        let input = p.prompt_with_default("Request timeout", &base.timeout)?;
        match humantime::parse_duration(&input) {
            Ok(d) if !d.is_zero() => break input,
            Ok(_) => p.say("  Invalid: must be greater than zero.")?,
            Err(e) => p.say(&format!("  Invalid: {}. Try again (e.g. 10s, 1m).", e))?,
        }
    };

    Ok(Config {
        organization: Some(organization),
        project,
        search_type,
        locale,
        timeout,
        ..base.clone()
    })
}

/// Run the interactive init wizard to create a config file.
///
/// If `default_path` is Some, uses that as the config file path.
/// Otherwise, prompts the user with the default config path.
pub fn run_init_wizard(default_path: Option<PathBuf>) -> Result<()> {
    let stdin = std::io::stdin();
    let mut prompter = Prompter {
        input: stdin.lock(),
        output: std::io::stdout(),
    };
    run_wizard(&mut prompter, default_path)
}

fn run_wizard<R: BufRead, W: Write>(p: &mut Prompter<R, W>, default_path: Option<PathBuf>) -> Result<()> {
    p.say("")?;
    p.say("ado-prs configuration")?;
    p.say("=====================")?;
    p.say("")?;

    let config = ask_config(p, &Config::default())?;
    if let Err(errors) = validate_config(&config) {
        anyhow::bail!("Invalid answers:\n  - {}", errors.join("\n  - "));
    }

    let default_config_path = match default_path {
        Some(path) => path,
        None => get_config_path()?,
    };
    p.say("")?;
    let path_str = p.prompt_with_default(
        "Where should the config be saved?",
        &default_config_path.display().to_string(),
    )?;
    let config_path = PathBuf::from(&path_str);

    if config_path.exists() {
        let overwrite = p.prompt_yes_no(
            &format!("Config already exists at {}. Overwrite?", config_path.display()),
            false,
        )?;
        if !overwrite {
            p.say("Aborted.")?;
            return Ok(());
        }
    }

    let yaml = serde_saphyr::to_string(&config)
        .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    std::fs::write(&config_path, &yaml)
        .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

    p.say("")?;
    p.say(&format!("Config written to {}", config_path.display()))?;
    p.say(&format!(
        "Set {} to your personal access token, then run `ado-prs`.",
        crate::credentials::ENV_TOKEN_VAR
    ))?;

    Ok(())
}
