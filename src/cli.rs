mod add;
mod drop;
mod files;
mod imply;
mod init;
mod query;
mod remove;
mod set;
mod tags;

use std::env;
use std::path::PathBuf;
use std::process;
use std::str;

use structopt::clap::arg_enum;
use structopt::clap::AppSettings::{ColoredHelp, UnifiedHelpMessage};
use structopt::StructOpt;

use crate::config::VaultConfig;
use crate::errors::*;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "vaultkeep",
    about = "A hierarchical, queryable tagging system for files",
    global_setting(UnifiedHelpMessage),
    global_setting(ColoredHelp),
)]
struct VaultOptions {
    #[structopt(flatten)]
    global_opts: GlobalOptions,

    #[structopt(subcommand)]
    cmd: SubCommands,
}

#[derive(Debug, StructOpt)]
pub struct GlobalOptions {
    /// Use the specified vault database
    #[structopt(short = "-D", long, env = "VAULTKEEP_DB", parse(from_os_str))]
    database: Option<PathBuf>,

    /// Colorize the output (auto/always/never)
    #[structopt(long, default_value = "auto")]
    color: ColorMode,

    /// Ignore case when matching tag names in queries and attach paths
    #[structopt(long)]
    ignore_tag_case: bool,
}

arg_enum! {
    #[derive(Debug)]
    enum ColorMode {
        Auto,
        Always,
        Never,
    }
}

#[derive(Debug, StructOpt)]
enum SubCommands {
    Init(init::InitOptions),
    Add(add::AddOptions),
    Remove(remove::RemoveOptions),
    Set(set::SetOptions),
    Drop(drop::DropOptions),
    Files(files::FilesOptions),
    Tags(tags::TagsOptions),
    Imply(imply::ImplyOptions),
    Query(query::QueryOptions),
}

/// CLI entry point, dispatching to subcommands.
pub fn run() -> Result<()> {
    let opt = VaultOptions::from_args();

    if let SubCommands::Init(init_opts) = &opt.cmd {
        return init_opts.execute(&opt.global_opts);
    }

    let config = vault_config(&opt.global_opts)?;

    match &opt.cmd {
        SubCommands::Init(_) => unreachable!("handled above"),
        SubCommands::Add(add_opts) => add_opts.execute(&config),
        SubCommands::Remove(remove_opts) => remove_opts.execute(&config),
        SubCommands::Set(set_opts) => set_opts.execute(&config),
        SubCommands::Drop(drop_opts) => drop_opts.execute(&config),
        SubCommands::Files(files_opts) => files_opts.execute(&config),
        SubCommands::Tags(tags_opts) => tags_opts.execute(&config),
        SubCommands::Imply(imply_opts) => imply_opts.execute(&config),
        SubCommands::Query(query_opts) => query_opts.execute(&config),
    }
}

fn vault_config(global_opts: &GlobalOptions) -> Result<VaultConfig> {
    let db_path = locate_db(&global_opts.database)?;
    info!("Vault database path: {}", db_path.display());

    let mut config = VaultConfig::new(db_path);
    config.ignore_tag_case_default = global_opts.ignore_tag_case;
    Ok(config)
}

fn locate_db(db_path: &Option<PathBuf>) -> Result<PathBuf> {
    match db_path {
        Some(path) => Ok(path.clone()),
        None => match find_database_upwards()? {
            Some(path) => Ok(path),
            None => match get_user_default_db() {
                Some(path) => Ok(path),
                None => Err(ErrorKind::NoDatabaseFound(PathBuf::default()).into()),
            },
        },
    }
}

/// Look for .vaultkeep/db in the current directory and ancestors.
fn find_database_upwards() -> Result<Option<PathBuf>> {
    let mut path = env::current_dir()?;

    loop {
        let mut db_path = path.clone();
        db_path.push(".vaultkeep");
        db_path.push("db");

        debug!("Looking for database at {:?}", &db_path);
        if db_path.is_file() {
            return Ok(Some(db_path));
        }

        match path.parent() {
            Some(parent) => path = PathBuf::from(parent),
            None => return Ok(None),
        }
    }
}

/// Return $HOME/.vaultkeep/default.db, or None if the home directory can't be resolved.
fn get_user_default_db() -> Option<PathBuf> {
    dirs::home_dir().map(|mut path| {
        path.push(".vaultkeep");
        path.push("default.db");
        path
    })
}

fn is_stdout_tty() -> bool {
    atty::is(atty::Stream::Stdout)
}

fn should_use_colour(color_mode: &ColorMode) -> bool {
    match color_mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => is_stdout_tty(),
    }
}

pub fn print_error(result: Result<()>) {
    if let Err(error) = result {
        eprintln!("vaultkeep: {}", error);

        if let Some(backtrace) = error.backtrace() {
            eprintln!("backtrace: {:?}", backtrace);
        }

        process::exit(1);
    }
}

fn generate_examples(examples: &[(&str, Option<&str>)]) -> String {
    generate_examples_inner(is_stdout_tty(), examples)
}

fn generate_examples_inner(use_color: bool, examples: &[(&str, Option<&str>)]) -> String {
    let header_style;
    let prompt_style;
    if use_color {
        header_style = ansi_term::Colour::Yellow.normal();
        prompt_style = ansi_term::Colour::Green.normal();
    } else {
        header_style = ansi_term::Style::default();
        prompt_style = ansi_term::Style::default();
    }

    let prompt = prompt_style.paint("$");

    let formatted: Vec<_> = examples
        .iter()
        .map(|(cmd_line, output)| {
            let output_str = match output {
                Some(s) => format!("\n    {}", s.replace('\n', "\n    ")),
                None => "".to_string(),
            };
            format!("    {} {}{}", prompt, cmd_line, output_str)
        })
        .collect();
    format!("{}\n{}", header_style.paint("EXAMPLES:"), formatted.join("\n"))
}

fn print_columns(strings: &[String]) {
    if is_stdout_tty() {
        println!("{}", strings.join("  "));
    } else {
        for s in strings {
            println!("{}", s);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gen_examples() {
        assert_eq!(
            generate_examples_inner(false, &[("hello", None)]),
            "EXAMPLES:
    $ hello"
        );

        assert_eq!(
            generate_examples_inner(false, &[("command", Some("this is some\nmulti-line output"))]),
            "EXAMPLES:
    $ command
    this is some
    multi-line output"
        );
    }
}
