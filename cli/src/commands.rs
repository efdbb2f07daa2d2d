use base64::{engine::general_purpose, Engine};
use clap::Subcommand;
use sdcore::{
    core::{describe_base64, remove_ace_base64, set_control_base64, set_owner_base64},
    utils::sd_toml::SdToml,
};
use std::{fs::read, str::from_utf8};

#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Describe the owner, group and every DACL entry
    Show {
        /// Base64 nTSecurityDescriptor value
        #[arg(long)]
        data: Option<String>,
        /// File holding the descriptor as base64 text or raw bytes
        #[arg(long)]
        file: Option<String>,
        /// Output format. JSON or TEXT. Overrides the config
        #[arg(long, default_value = None)]
        format: Option<String>,
    },
    /// Remove a DACL entry and print the new descriptor as base64
    DeleteAce {
        #[arg(long)]
        data: Option<String>,
        #[arg(long)]
        file: Option<String>,
        /// Position of the ACE in the DACL, starting at 0
        #[arg(long)]
        index: usize,
    },
    /// Change the owner (and optionally the group) and print the new descriptor as base64
    SetOwner {
        #[arg(long)]
        data: Option<String>,
        #[arg(long)]
        file: Option<String>,
        /// Owner SID, ex: S-1-5-32-544
        #[arg(long)]
        owner: String,
        /// Group SID
        #[arg(long, default_value = None)]
        group: Option<String>,
    },
    /// Overwrite the control flags and print the new descriptor as base64
    SetControl {
        #[arg(long)]
        data: Option<String>,
        #[arg(long)]
        file: Option<String>,
        /// Control word, decimal or 0x prefixed hex
        #[arg(long)]
        control: String,
    },
}

/// Run one subcommand and return what should be printed
pub(crate) fn run_command(command: &Commands, config: &SdToml) -> Result<String, String> {
    let result = match command {
        Commands::Show { data, file, format } => {
            let input = descriptor_input(data, file)?;
            let mut options = config.clone();
            if let Some(value) = format {
                options.output.format = value.to_lowercase();
            }
            describe_base64(&input, &options)
        }
        Commands::DeleteAce { data, file, index } => {
            let input = descriptor_input(data, file)?;
            remove_ace_base64(&input, *index)
        }
        Commands::SetOwner {
            data,
            file,
            owner,
            group,
        } => {
            let input = descriptor_input(data, file)?;
            set_owner_base64(&input, owner, group.as_deref())
        }
        Commands::SetControl {
            data,
            file,
            control,
        } => {
            let input = descriptor_input(data, file)?;
            let value = parse_control(control)?;
            set_control_base64(&input, value)
        }
    };

    result.map_err(|err| format!("Command failed: {err}"))
}

/// Base64 descriptor from `--data` or `--file`
fn descriptor_input(data: &Option<String>, file: &Option<String>) -> Result<String, String> {
    if let Some(value) = data {
        if !value.is_empty() {
            return Ok(value.to_string());
        }
    }

    let path = match file {
        Some(result) if !result.is_empty() => result,
        _ => return Err(String::from("No descriptor data or file provided!")),
    };
    let buffer = match read(path) {
        Ok(result) => result,
        Err(err) => return Err(format!("Failed to read {path}: {err}")),
    };

    // Raw descriptors start with a revision byte so they are never valid text
    match from_utf8(&buffer) {
        Ok(text) => Ok(text.trim().to_string()),
        Err(_) => Ok(general_purpose::STANDARD.encode(&buffer)),
    }
}

/// Accept `0x8c14` or `35860`
fn parse_control(control: &str) -> Result<u16, String> {
    let value = control.trim();
    let parse_result = match value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
    {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => value.parse::<u16>(),
    };
    parse_result.map_err(|err| format!("Invalid control value {control}: {err}"))
}

#[cfg(test)]
mod tests {
    use super::{descriptor_input, parse_control, run_command, Commands};
    use sdcore::utils::sd_toml::SdToml;
    use std::path::PathBuf;

    fn fixture(name: &str) -> String {
        let mut test_location = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        test_location.push("../core/tests/test_data");
        test_location.push(name);
        test_location.display().to_string()
    }

    #[test]
    fn test_run_show() {
        let command = Commands::Show {
            data: None,
            file: Some(fixture("ad_user.b64")),
            format: Some(String::from("TEXT")),
        };
        let result = run_command(&command, &SdToml::default()).unwrap();
        assert!(result.contains("[0] Allow NT AUTHORITY\\SYSTEM severity 3"));
    }

    #[test]
    fn test_run_show_raw_file() {
        let command = Commands::Show {
            data: None,
            file: Some(fixture("ad_user.raw")),
            format: None,
        };
        let result = run_command(&command, &SdToml::default()).unwrap();
        assert!(result.contains("\"max_severity\": 3"));
    }

    #[test]
    fn test_same_input_from_both_files() {
        let text = descriptor_input(&None, &Some(fixture("ad_user.b64"))).unwrap();
        let raw = descriptor_input(&None, &Some(fixture("ad_user.raw"))).unwrap();
        assert_eq!(text, raw);
    }

    #[test]
    fn test_run_delete_ace() {
        let data = descriptor_input(&None, &Some(fixture("ad_user.b64"))).unwrap();
        let command = Commands::DeleteAce {
            data: Some(data.clone()),
            file: None,
            index: 1,
        };
        let result = run_command(&command, &SdToml::default()).unwrap();
        assert_ne!(result, data);

        let command = Commands::DeleteAce {
            data: Some(data),
            file: None,
            index: 40,
        };
        assert!(run_command(&command, &SdToml::default()).is_err());
    }

    #[test]
    fn test_run_set_control() {
        let data = descriptor_input(&None, &Some(fixture("ad_user.b64"))).unwrap();
        let command = Commands::SetControl {
            data: Some(data.clone()),
            file: None,
            control: String::from("0x8c14"),
        };
        assert_eq!(run_command(&command, &SdToml::default()).unwrap(), data);
    }

    #[test]
    fn test_no_input() {
        let command = Commands::SetOwner {
            data: None,
            file: None,
            owner: String::from("S-1-5-32-544"),
            group: None,
        };
        assert!(run_command(&command, &SdToml::default()).is_err());
    }

    #[test]
    fn test_parse_control() {
        assert_eq!(parse_control("0x8c14").unwrap(), 0x8c14);
        assert_eq!(parse_control("35860").unwrap(), 0x8c14);
        assert!(parse_control("0x1ffff").is_err());
        assert!(parse_control("full").is_err());
    }
}
