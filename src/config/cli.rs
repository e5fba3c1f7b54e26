use crate::config::toml_config::TomlConfig;
use crate::domain::model::CategoryRow;
use crate::utils::error::Result;
use crate::utils::validation;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "cemt")]
#[command(about = "Browse and edit the CEMT vessel class table, and classify vessels by size")]
pub struct CliConfig {
    /// Path to TOML configuration file (defaults to ./cemt.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Table file to work on (.xlsx or .csv), overrides [table].path
    #[arg(short, long, global = true)]
    pub table: Option<String>,

    /// Directory holding cemt_<class>.jpg / .png images, overrides [images].dir
    #[arg(long, global = true)]
    pub images: Option<String>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Print the whole table with row indices
    Show,
    /// List the distinct CEMT classes
    Categories,
    /// Show the width ranges available for a vessel length
    Widths {
        #[arg(long)]
        length: f64,
    },
    /// Match a vessel length and width to a CEMT class
    Classify {
        #[arg(long)]
        length: f64,
        #[arg(long)]
        width: f64,
    },
    /// Show the rows and reference image of one class
    Category { id: String },
    /// Append a row and save the table
    Add(AddRow),
    /// Remove a row by index and save the table
    Remove { index: usize },
    /// Edit one cell and save the table
    Set {
        index: usize,
        column: String,
        value: String,
    },
    /// Save the table to another file (format from the extension)
    SaveAs { path: PathBuf },
}

#[derive(Debug, Clone, Args)]
pub struct AddRow {
    #[arg(long)]
    pub id: String,
    #[arg(long)]
    pub min_length: f64,
    #[arg(long)]
    pub max_length: f64,
    #[arg(long)]
    pub min_width: f64,
    #[arg(long)]
    pub max_width: f64,
    #[arg(long, default_value = "")]
    pub route: String,
    #[arg(long, default_value_t = 0)]
    pub fleet_count: u64,
    #[arg(long, default_value_t = 0.0)]
    pub distance_km: f64,
    #[arg(long, default_value_t = 0.0)]
    pub duration_h: f64,
}

impl AddRow {
    /// clap 會把 "NaN"、"inf" 解析成 f64，寫入前先擋下
    pub fn validate(&self) -> Result<()> {
        validation::validate_non_empty_string("id", &self.id)?;
        validation::validate_finite("min_length", self.min_length)?;
        validation::validate_finite("max_length", self.max_length)?;
        validation::validate_finite("min_width", self.min_width)?;
        validation::validate_finite("max_width", self.max_width)?;
        validation::validate_finite("distance_km", self.distance_km)?;
        validation::validate_finite("duration_h", self.duration_h)
    }

    /// The id goes through `CategoryRow::new`, so it is trimmed like a loaded one.
    pub fn into_row(self) -> CategoryRow {
        CategoryRow {
            typical_route: self.route,
            fleet_count: self.fleet_count,
            typical_distance_km: self.distance_km,
            typical_duration_h: self.duration_h,
            ..CategoryRow::new(
                self.id,
                (self.min_length, self.max_length),
                (self.min_width, self.max_width),
            )
        }
    }
}

impl CliConfig {
    /// 命令列參數覆蓋 TOML 設定
    pub fn apply_overrides(&self, config: &mut TomlConfig) {
        if let Some(table) = &self.table {
            tracing::debug!("🔧 Table path overridden to: {}", table);
            config.table.path = table.clone();
        }
        if let Some(images) = &self.images {
            tracing::debug!("🔧 Image directory overridden to: {}", images);
            config.images.dir = images.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_classify_with_global_flags() {
        let cli = CliConfig::parse_from([
            "cemt", "classify", "--length", "80", "--width", "9.5", "--table", "cemt.csv", "--json",
        ]);

        assert!(cli.json);
        assert_eq!(cli.table.as_deref(), Some("cemt.csv"));
        match cli.command {
            Command::Classify { length, width } => {
                assert_eq!(length, 80.0);
                assert_eq!(width, 9.5);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_overrides_replace_config_values() {
        let cli = CliConfig::parse_from(["cemt", "--table", "upload.xlsx", "--images", "pics", "show"]);
        let mut config = TomlConfig::default();
        cli.apply_overrides(&mut config);

        assert_eq!(config.table.path, "upload.xlsx");
        assert_eq!(config.images.dir, "pics");
    }

    #[test]
    fn test_add_row_defaults() {
        let cli = CliConfig::parse_from([
            "cemt", "add", "--id", "VIb", "--min-length", "140", "--max-length", "140",
            "--min-width", "15", "--max-width", "15",
        ]);
        let Command::Add(add) = cli.command else {
            panic!("expected add");
        };
        let row = add.into_row();
        assert_eq!(row.category_id(), Some("VIb"));
        assert_eq!(row.fleet_count, 0);
        assert_eq!(row.typical_route, "");
    }

    fn parse_add(args: &[&str]) -> AddRow {
        let mut argv = vec!["cemt", "add"];
        argv.extend_from_slice(args);
        match CliConfig::parse_from(argv).command {
            Command::Add(add) => add,
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_add_row_rejects_non_finite_numbers() {
        let add = parse_add(&[
            "--id", "X", "--min-length", "NaN", "--max-length", "inf", "--min-width", "5",
            "--max-width", "9",
        ]);
        let err = add.validate().unwrap_err();
        assert!(matches!(
            err,
            crate::utils::error::CemtError::InvalidConfigValueError { ref field, .. } if field == "min_length"
        ));

        let add = parse_add(&[
            "--id", "X", "--min-length", "40", "--max-length", "80", "--min-width", "5",
            "--max-width", "9", "--duration-h=-inf",
        ]);
        assert!(add.validate().is_err());
    }

    #[test]
    fn test_add_row_trims_id() {
        let add = parse_add(&[
            "--id", " Va ", "--min-length", "95", "--max-length", "110", "--min-width", "11.4",
            "--max-width", "11.4",
        ]);
        assert!(add.validate().is_ok());
        assert_eq!(add.into_row().category_id(), Some("Va"));
    }
}
