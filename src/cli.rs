// SPDX-License-Identifier: GPL-3.0-only

//! Command-line host for the preset store and resolution engine.
//!
//! The binary plays the part of the host node: it loads the persisted store
//! from a file, applies one action, and writes the store back when the action
//! changed it.
//!
//! ```bash
//! resolution-master add "My Sizes" Banner 1500 500
//! resolution-master fit --width 1200 --height 1000 --category Flux --calc
//! resolution-master export --output presets-backup.json
//! ```

use crate::app_settings;
use crate::config::Config;
use crate::engine::RescaleMode;
use crate::presets::{load_builtin_catalog, Catalog, PresetStore};
use crate::session::Session;
use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::PathBuf;

/// Preset store and resolution calculator.
#[derive(Parser, Debug)]
#[command(name = app_settings::APP_NAME, version, about)]
pub struct CliArgs {
    /// Configuration file (missing file means defaults).
    #[arg(long, value_name = "FILE", default_value = app_settings::DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Preset store file; overrides the configured path.
    #[arg(long, value_name = "FILE")]
    pub store: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List categories and presets
    List {
        /// Only this category
        #[arg(long)]
        category: Option<String>,
        /// Include hidden built-in presets
        #[arg(long)]
        all: bool,
    },
    /// Add or overwrite a custom preset
    Add {
        category: String,
        name: String,
        width: u32,
        height: u32,
    },
    /// Delete a custom preset
    Delete { category: String, name: String },
    /// Rename a custom preset in place
    Rename {
        category: String,
        old_name: String,
        new_name: String,
    },
    /// Rename and resize a custom preset in place
    Update {
        category: String,
        old_name: String,
        new_name: String,
        width: u32,
        height: u32,
    },
    /// Rename a custom category in place
    RenameCategory { old_name: String, new_name: String },
    /// Delete a custom category and its presets
    DeleteCategory { name: String },
    /// Move a custom category to a position
    ReorderCategory { name: String, index: usize },
    /// Move a custom preset to a position within its category
    Reorder {
        category: String,
        name: String,
        index: usize,
    },
    /// Move a custom preset to another category
    Move {
        source: String,
        name: String,
        target: String,
        /// Position in the target category (default: end)
        #[arg(long)]
        index: Option<usize>,
    },
    /// Copy a built-in or custom preset into a new custom preset
    Duplicate {
        source_category: String,
        source_name: String,
        target_category: String,
        target_name: String,
    },
    /// Hide or unhide a built-in preset
    Hide { category: String, name: String },
    /// Import presets from a file
    Import {
        file: PathBuf,
        /// Replace everything instead of merging
        #[arg(long)]
        replace: bool,
    },
    /// Export presets (stdout unless --output is given)
    Export {
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Show custom preset counts
    Stats,
    /// Find the closest preset in a category
    Closest {
        #[command(flatten)]
        size: SizeArgs,
    },
    /// Snap dimensions to a category, optionally through its calculation
    Fit {
        #[command(flatten)]
        size: SizeArgs,
        /// Enable calc mode for the category
        #[arg(long)]
        calc: bool,
    },
    /// Rescale dimensions
    Scale {
        #[arg(long)]
        width: u32,
        #[arg(long)]
        height: u32,
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,
        /// Factor, target "P" height, or megapixels depending on the mode
        #[arg(long)]
        value: Option<f64>,
    },
}

#[derive(clap::Args, Debug)]
pub struct SizeArgs {
    #[arg(long)]
    pub width: u32,
    #[arg(long)]
    pub height: u32,
    /// Category to match against (default: configured category)
    #[arg(long)]
    pub category: Option<String>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum ModeArg {
    Manual,
    Resolution,
    Megapixels,
}

impl From<ModeArg> for RescaleMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Manual => RescaleMode::Manual,
            ModeArg::Resolution => RescaleMode::Resolution,
            ModeArg::Megapixels => RescaleMode::Megapixels,
        }
    }
}

fn path_str(path: &std::path::Path) -> Result<&str> {
    path.to_str()
        .ok_or_else(|| anyhow!("Path is not valid UTF-8: {}", path.display()))
}

fn check_size(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(anyhow!("Width and height must be positive, got {}x{}", width, height));
    }
    Ok(())
}

/// Runs one command.
pub fn run(args: CliArgs) -> Result<()> {
    let config = Config::load(path_str(&args.config)?)?;
    let store_path = match &args.store {
        Some(path) => path_str(path)?.to_string(),
        None => config.store_path.clone(),
    };

    let builtins = load_builtin_catalog().context("Failed to load built-in presets")?;
    let mut store = PresetStore::from_file(&store_path)?;

    let changed = execute(args.command, &config, &builtins, &mut store)?;
    if changed {
        store.save_to_file(&store_path)?;
        tracing::info!("Saved presets to '{}'", store_path);
    }
    Ok(())
}

/// Executes a command against the store. Returns whether the store changed.
fn execute(command: Command, config: &Config, builtins: &Catalog, store: &mut PresetStore) -> Result<bool> {
    match command {
        Command::List { category, all } => {
            for (name, presets) in store.merged(builtins).iter() {
                if category.as_deref().is_some_and(|c| c != name) {
                    continue;
                }
                println!("{}", name);
                for (preset, entry) in presets.iter() {
                    if entry.is_hidden && !all {
                        continue;
                    }
                    let mut flags = String::new();
                    if entry.is_custom {
                        flags.push_str(" [custom]");
                    }
                    if entry.is_hidden {
                        flags.push_str(" [hidden]");
                    }
                    println!("  {:<28} {}{}", preset, entry.dimension(), flags);
                }
            }
            Ok(false)
        }
        Command::Add {
            category,
            name,
            width,
            height,
        } => {
            store.add(&category, &name, width, height)?;
            Ok(true)
        }
        Command::Delete { category, name } => {
            store.delete(&category, &name)?;
            Ok(true)
        }
        Command::Rename {
            category,
            old_name,
            new_name,
        } => {
            store.rename(&category, &old_name, &new_name)?;
            Ok(true)
        }
        Command::Update {
            category,
            old_name,
            new_name,
            width,
            height,
        } => {
            store.update(&category, &old_name, &new_name, width, height)?;
            Ok(true)
        }
        Command::RenameCategory { old_name, new_name } => {
            store.rename_category(&old_name, &new_name)?;
            Ok(true)
        }
        Command::DeleteCategory { name } => {
            store.delete_category(&name)?;
            Ok(true)
        }
        Command::ReorderCategory { name, index } => {
            store.reorder_categories(&name, index)?;
            Ok(true)
        }
        Command::Reorder {
            category,
            name,
            index,
        } => {
            store.reorder_presets(&category, &name, index)?;
            Ok(true)
        }
        Command::Move {
            source,
            name,
            target,
            index,
        } => {
            store.move_preset(&source, &name, &target, index)?;
            Ok(true)
        }
        Command::Duplicate {
            source_category,
            source_name,
            target_category,
            target_name,
        } => {
            store.duplicate(
                &source_category,
                &source_name,
                &target_category,
                &target_name,
                builtins,
            )?;
            Ok(true)
        }
        Command::Hide { category, name } => {
            let hidden = store.toggle_hidden(&category, &name, builtins)?;
            println!("{} / {}: {}", category, name, if hidden { "hidden" } else { "visible" });
            Ok(true)
        }
        Command::Import { file, replace } => {
            let path = path_str(&file)?;
            let json = fs::read_to_string(path).with_context(|| format!("Failed to read '{}'", path))?;
            let count = store.import_json(&json, !replace)?;
            println!("Imported {} preset(s)", count);
            Ok(true)
        }
        Command::Export { output } => {
            let json = store.export_json()?;
            match output {
                Some(path) => {
                    fs::write(&path, json)
                        .with_context(|| format!("Failed to write '{}'", path.display()))?;
                }
                None => println!("{}", json),
            }
            Ok(false)
        }
        Command::Stats => {
            let stats = store.stats();
            println!("Custom categories: {}", stats.category_count);
            println!("Custom presets:    {}", stats.preset_count);
            println!("Hidden built-ins:  {}", stats.hidden_count);
            Ok(false)
        }
        Command::Closest { size } => {
            let session = size_session(&size, false, config, builtins, store)?;
            match session.closest_preset() {
                Some(found) => println!("{} ({})", found.name, found.dimension()),
                None => println!("No presets in '{}'", session.category()),
            }
            Ok(false)
        }
        Command::Fit { size, calc } => {
            let mut session = size_session(&size, calc, config, builtins, store)?;
            match session.auto_fit() {
                Some(fitted) => println!("{}", fitted),
                None => println!("No presets in '{}'", session.category()),
            }
            Ok(false)
        }
        Command::Scale {
            width,
            height,
            mode,
            value,
        } => {
            check_size(width, height)?;
            let mut session = Session::from_config(config, builtins.clone(), store.clone());
            session.set_size(Some(width), Some(height));
            if let Some(mode) = mode {
                session.rescale.mode = mode.into();
            }
            if let Some(value) = value {
                match session.rescale.mode {
                    RescaleMode::Manual => session.rescale.manual_scale = value,
                    RescaleMode::Resolution => session.rescale.target_resolution = value,
                    RescaleMode::Megapixels => session.rescale.target_megapixels = value,
                }
            }
            let factor = session.scale_factor().unwrap_or(1.0);
            if let Some(scaled) = session.auto_resize() {
                println!("{} (x{:.4})", scaled, factor);
            }
            Ok(false)
        }
    }
}

fn size_session(
    size: &SizeArgs,
    calc: bool,
    config: &Config,
    builtins: &Catalog,
    store: &PresetStore,
) -> Result<Session> {
    check_size(size.width, size.height)?;
    let mut session = Session::from_config(config, builtins.clone(), store.clone());
    session.set_size(Some(size.width), Some(size.height));
    if let Some(category) = &size.category {
        if !session.select_category(category) {
            return Err(anyhow!("Unknown category '{}'", category));
        }
    }
    if calc {
        let category = session.category().to_string();
        session.set_calc_enabled(&category, true);
    }
    Ok(session)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn run_with(dir: &TempDir, args: &[&str]) -> Result<()> {
        let store = dir.path().join("store.json");
        let config = dir.path().join("config.json");
        let mut argv = vec![
            "resolution-master",
            "--config",
            config.to_str().unwrap(),
            "--store",
            store.to_str().unwrap(),
        ];
        argv.extend_from_slice(args);
        run(CliArgs::try_parse_from(argv)?)
    }

    fn load(dir: &TempDir) -> PresetStore {
        PresetStore::from_file(dir.path().join("store.json").to_str().unwrap()).unwrap()
    }

    /// Test 1: Mutating commands persist the store
    #[test]
    fn test_mutations_persist() {
        let dir = TempDir::new().unwrap();
        run_with(&dir, &["add", "Mine", "Banner", "1500", "500"]).unwrap();
        run_with(&dir, &["add", "Mine", "Square", "512", "512"]).unwrap();
        run_with(&dir, &["rename", "Mine", "Banner", "Wide Banner"]).unwrap();
        run_with(&dir, &["hide", "SDXL", "1:1 Square"]).unwrap();

        let store = load(&dir);
        let mine = store.custom_presets().get("Mine").unwrap();
        assert_eq!(mine.keys().collect::<Vec<_>>(), vec!["Wide Banner", "Square"]);
        assert!(store.is_hidden("SDXL", "1:1 Square"));
    }

    /// Test 2: Rejected mutations surface as errors and leave the file alone
    #[test]
    fn test_rejected_mutation() {
        let dir = TempDir::new().unwrap();
        run_with(&dir, &["add", "Mine", "A", "64", "64"]).unwrap();
        assert!(run_with(&dir, &["delete", "Mine", "Nope"]).is_err());
        assert!(run_with(&dir, &["hide", "Mine", "A"]).is_err());
        assert_eq!(load(&dir).stats().preset_count, 1);
    }

    /// Test 3: Export and replace-import
    #[test]
    fn test_export_import() {
        let dir = TempDir::new().unwrap();
        run_with(&dir, &["add", "Mine", "A", "64", "64"]).unwrap();
        let backup = dir.path().join("backup.json");
        run_with(&dir, &["export", "--output", backup.to_str().unwrap()]).unwrap();

        run_with(&dir, &["delete", "Mine", "A"]).unwrap();
        assert_eq!(load(&dir).stats().preset_count, 0);

        run_with(&dir, &["import", backup.to_str().unwrap(), "--replace"]).unwrap();
        assert_eq!(load(&dir).stats().preset_count, 1);
    }

    /// Test 4: Calculation commands accept known categories only
    #[test]
    fn test_calculation_commands() {
        let dir = TempDir::new().unwrap();
        run_with(&dir, &["fit", "--width", "1200", "--height", "1000", "--category", "Flux", "--calc"])
            .unwrap();
        run_with(&dir, &["closest", "--width", "1080", "--height", "1920"]).unwrap();
        run_with(&dir, &["scale", "--width", "1000", "--height", "1000", "--mode", "megapixels", "--value", "4"])
            .unwrap();
        assert!(run_with(&dir, &["fit", "--width", "1", "--height", "1", "--category", "Nope"]).is_err());
        assert!(!dir.path().join("store.json").exists(), "Read-only commands do not write");
    }

    /// Test 5: Zero-sized inputs are rejected before any calculation
    #[test]
    fn test_zero_size_rejected() {
        let dir = TempDir::new().unwrap();
        for args in [
            &["closest", "--width", "0", "--height", "1080"][..],
            &["fit", "--width", "1920", "--height", "0", "--category", "Flux"][..],
            &["scale", "--width", "0", "--height", "0"][..],
        ] {
            let err = run_with(&dir, args).unwrap_err();
            assert!(
                err.to_string().contains("must be positive"),
                "{:?} gave {}",
                args,
                err
            );
        }
    }
}
