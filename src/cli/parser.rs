use crate::auth::Role;
use crate::models::ReportType;
use clap::{Parser, Subcommand};

/// Command-line interface definition for coursereport
/// Enrollment listing and PDF report export over a SQLite course database
#[derive(Parser)]
#[command(
    name = "coursereport",
    version = env!("CARGO_PKG_VERSION"),
    about = "Course enrollment reports: select enrollments and export dedication or certification PDFs",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and configuration
    Init,

    /// Inspect the configuration file
    Config {
        #[arg(long = "print", help = "Print the effective configuration")]
        print_config: bool,

        #[arg(long = "check", help = "Check configuration file for missing fields")]
        check: bool,

        #[arg(long = "migrate", help = "Add missing fields to the configuration file")]
        migrate: bool,
    },

    /// Manage the database (migrations, integrity checks, etc.)
    Db {
        #[arg(long = "migrate", help = "Run pending database migrations")]
        migrate: bool,

        #[arg(long = "check", help = "Check database integrity")]
        check: bool,

        #[arg(long = "vacuum", help = "Optimize the database using VACUUM")]
        vacuum: bool,

        #[arg(long = "info", help = "Show database information")]
        info: bool,
    },

    /// Print or manage the internal log table
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,
    },

    /// List one page of enrollments matching a filter
    List {
        #[arg(long = "company", value_delimiter = ',', help = "Company ids (comma separated)")]
        company: Vec<i64>,

        #[arg(long = "center", value_delimiter = ',', help = "Center ids (comma separated)")]
        center: Vec<i64>,

        #[arg(long = "course", help = "Course id")]
        course: Option<i64>,

        #[arg(long = "group", value_delimiter = ',', help = "Group ids (comma separated)")]
        group: Vec<i64>,

        #[arg(long, short, help = "Free text over name, surnames, dni, email and username")]
        search: Option<String>,

        #[arg(long = "from", value_name = "YYYY-MM-DD", help = "Groups starting on or after")]
        from: Option<String>,

        #[arg(long = "to", value_name = "YYYY-MM-DD", help = "Groups ending on or before")]
        to: Option<String>,

        #[arg(long = "sort", help = "Sort field (name, first_surname, completion_percentage, ...)")]
        sort: Option<String>,

        #[arg(long = "desc", help = "Sort descending")]
        desc: bool,

        #[arg(long, short, default_value_t = 1)]
        page: u32,

        #[arg(long, short, help = "Rows per page (default from config)")]
        limit: Option<u32>,
    },

    /// Export a dedication or certification PDF
    Export {
        #[arg(
            long,
            value_name = "JSON|@FILE",
            help = "Export request body, inline or @path to a JSON file"
        )]
        request: Option<String>,

        #[arg(long = "type", value_enum, help = "Report type (overrides the request)")]
        report_type: Option<ReportType>,

        #[arg(long, help = "Include the platform password column (dedication only)")]
        passwords: bool,

        #[arg(long, help = "Template id (overrides the request and the config)")]
        template: Option<String>,

        #[arg(long, short, value_name = "FILE", help = "Output file, or '-' for stdout")]
        out: Option<String>,

        #[arg(long, value_enum, default_value = "admin", help = "Caller role")]
        role: Role,

        #[arg(long, short = 'f', help = "Overwrite the output file without asking")]
        force: bool,

        #[arg(long = "dry-run", help = "Resolve and lay out the report without writing it")]
        dry_run: bool,
    },

    /// Replay selection actions and print the encoded export request
    Select {
        #[arg(value_name = "JSON|@FILE", help = "Script: {\"total\", \"filter\", \"actions\"}")]
        script: String,

        #[arg(long = "type", value_enum, default_value = "dedication")]
        report_type: ReportType,

        #[arg(long, help = "Include the platform password column")]
        passwords: bool,
    },
}
