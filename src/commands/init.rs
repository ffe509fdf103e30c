use anyhow::{bail, Context, Result};
use colored::Colorize;
use std::io::{self, Write};

use crate::config::Config;
use crate::lookup::WriteMode;

/// Run the init command - interactively create a config file
pub fn run(force: bool) -> Result<()> {
    let config_path = Config::config_path()?;

    if config_path.exists() && !force {
        eprintln!(
            "{}: Config already exists at {}",
            "Error".red().bold(),
            config_path.display()
        );
        eprintln!();
        eprintln!("Use {} to overwrite.", "--force".cyan());
        bail!("Config file already exists");
    }

    println!("{}", "cbztag configuration".bold());
    println!();
    println!(
        "This will create a config file at: {}",
        config_path.display().to_string().cyan()
    );
    println!();

    println!("{}", "Step 1: ComicVine API key".bold());
    println!("Get one at https://comicvine.gamespot.com/api/ (leave blank to set CV_API_KEY later).");
    let api_key = prompt("API key", "")?;

    println!();
    println!("{}", "Step 2: Default write mode".bold());
    println!("  merge     - keep existing fields the source leaves empty");
    println!("  overwrite - replace ComicInfo.xml entirely");
    let mode = loop {
        let input = prompt("Mode", WriteMode::Merge.as_str())?;
        match input.parse::<WriteMode>() {
            Ok(mode) => break mode,
            Err(e) => println!("{}: {}", "Invalid".yellow(), e),
        }
    };

    println!();
    println!("{}", "Step 3: Default language".bold());
    let language = prompt("LanguageISO for tagged files", "en")?;

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {:?}", parent))?;
    }

    let config_content = format!(
        r#"# cbztag configuration
# See 'cbztag fields' for the ComicInfo.xml fields

[comicvine]
api_key = {}

[tagging]
mode = "{}"
language = {}
rename = false
"#,
        toml_string(&api_key),
        mode,
        toml_string(&language),
    );

    std::fs::write(&config_path, &config_content)
        .with_context(|| format!("Failed to write {:?}", config_path))?;

    println!();
    println!(
        "{} Config written to {}",
        "✓".green(),
        config_path.display()
    );
    println!();
    println!("You can now use:");
    println!(
        "  {} - preview tags from ComicVine",
        "cbztag tag <file.cbz> --issue-id <id>".cyan()
    );
    println!(
        "  {} - find volume and issue ids",
        "cbztag search --series <name>".cyan()
    );

    Ok(())
}

fn prompt(label: &str, default: &str) -> Result<String> {
    if default.is_empty() {
        print!("{}: ", label);
    } else {
        print!("{} [{}]: ", label, default.green());
    }
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim();

    Ok(if input.is_empty() {
        default.to_string()
    } else {
        input.to_string()
    })
}

/// Quote a value as a TOML basic string
fn toml_string(value: &str) -> String {
    toml::Value::String(value.to_string()).to_string()
}
