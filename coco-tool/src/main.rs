use anyhow::{Context, Result};
use clap::Parser;
use coco_dataset::{
    catalog::CocoCatalog, config::DatasetConfig, dataset::CocoDataset, storage::DirImageStorage,
};
use log::info;
use prettytable::{cell, row, Table};
use std::{env, path::PathBuf};

#[derive(Debug, Clone, Parser)]
/// Inspect COCO style datasets and their training targets
enum Opts {
    /// Summarize the catalog and the images kept for training.
    Info {
        #[clap(long, default_value = "dataset.json5")]
        /// configuration file
        config: PathBuf,
    },
    /// Print the training target of one dataset index as JSON.
    Show {
        #[clap(long, default_value = "dataset.json5")]
        /// configuration file
        config: PathBuf,
        #[clap(allow_hyphen_values = true)]
        /// position in the dataset
        index: isize,
    },
}

fn main() -> Result<()> {
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    pretty_env_logger::init();

    match Opts::parse() {
        Opts::Info { config } => {
            self::info(config)?;
        }
        Opts::Show { config, index } => {
            show(config, index)?;
        }
    }

    Ok(())
}

fn load(config_file: PathBuf) -> Result<CocoDataset<CocoCatalog, DirImageStorage>> {
    let config = DatasetConfig::open(&config_file)
        .with_context(|| format!("failed to load config file '{}'", config_file.display()))?;
    info!("using annotation file '{}'", config.annotation_file.display());
    CocoDataset::from_config(&config)
}

fn info(config_file: PathBuf) -> Result<()> {
    let dataset = load(config_file)?;
    let catalog = dataset.catalog();
    let stats = catalog.stats();

    // print catalog summary
    {
        let mut table = Table::new();
        table.add_row(row!["item", "count"]);
        table.add_row(row!["images", stats.num_images]);
        table.add_row(row![
            "images without annotations",
            stats.num_images_without_annotations
        ]);
        table.add_row(row!["images kept for training", dataset.len()]);
        table.add_row(row!["annotations", stats.num_annotations]);
        table.add_row(row!["crowd annotations", stats.num_crowd_annotations]);
        table.add_row(row![
            "annotations with keypoints",
            stats.num_keypoint_annotations
        ]);
        table.add_row(row!["categories", stats.num_categories]);
        table.printstd();
    }

    // print label mapping
    {
        let mut table = Table::new();
        table.add_row(row!["label", "category id", "name", "supercategory"]);

        dataset.remap().iter().for_each(|(label, category_id)| {
            let category = catalog.category(category_id);
            table.add_row(row![
                label,
                category_id,
                category.map(|cat| cat.name.as_str()).unwrap_or(""),
                category
                    .and_then(|cat| cat.supercategory.as_deref())
                    .unwrap_or(""),
            ]);
        });

        table.printstd();
    }

    Ok(())
}

fn show(config_file: PathBuf, index: isize) -> Result<()> {
    let dataset = load(config_file)?;
    let record = dataset.get_img_info(index)?;
    info!(
        "image {} '{}' ({}x{})",
        record.id, record.file_name, record.width, record.height
    );

    let (_image, target, _index) = dataset.get_item(index)?;
    println!("{}", serde_json::to_string_pretty(&target.to_json()?)?);
    Ok(())
}
