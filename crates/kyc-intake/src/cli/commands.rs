//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::capture::FacingMode;
use crate::form::PhotoField;

/// Submit command arguments.
#[derive(Debug, Args)]
pub struct SubmitCommand {
    /// Applicant name
    #[arg(short, long)]
    pub name: String,

    /// Image file for the front of the card
    #[arg(long, value_name = "FILE")]
    pub front: Option<PathBuf>,

    /// Image file for the back of the card
    #[arg(long, value_name = "FILE")]
    pub back: Option<PathBuf>,

    /// Capture the front of the card with the camera
    #[arg(long)]
    pub camera_front: bool,

    /// Capture the back of the card with the camera
    #[arg(long)]
    pub camera_back: bool,

    /// Camera facing preference (overrides configuration)
    #[arg(long, value_enum)]
    pub facing: Option<FacingArg>,

    /// Upload endpoint (overrides configuration)
    #[arg(short, long, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Capture and use the first frame without prompting
    #[arg(short, long)]
    pub yes: bool,

    /// Output the receipt as JSON
    #[arg(short, long)]
    pub json: bool,
}

impl SubmitCommand {
    /// Slots to fill with the camera, in form order.
    #[must_use]
    pub fn camera_fields(&self) -> Vec<PhotoField> {
        let mut fields = Vec::new();
        if self.camera_front {
            fields.push(PhotoField::Front);
        }
        if self.camera_back {
            fields.push(PhotoField::Back);
        }
        fields
    }

    /// Image files to attach, in form order.
    #[must_use]
    pub fn files(&self) -> Vec<(PhotoField, PathBuf)> {
        [(PhotoField::Front, &self.front), (PhotoField::Back, &self.back)]
            .into_iter()
            .filter_map(|(field, path)| path.clone().map(|p| (field, p)))
            .collect()
    }
}

/// Devices command arguments.
#[derive(Debug, Args)]
pub struct DevicesCommand {
    /// Facing preference used to mark the selected camera
    #[arg(long, value_enum)]
    pub facing: Option<FacingArg>,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Camera facing argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FacingArg {
    /// Rear camera
    Environment,
    /// Front camera
    User,
}

impl From<FacingArg> for FacingMode {
    fn from(arg: FacingArg) -> Self {
        match arg {
            FacingArg::Environment => Self::Environment,
            FacingArg::User => Self::User,
        }
    }
}
