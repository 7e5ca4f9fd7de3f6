//! Demo catalog seeder.
//!
//! Loads a small but representative catalog: part brands, the category
//! tree, a handful of products with OEM references and stock, and a vehicle
//! fitment chain to exercise the chained filters. Ids are derived from
//! stable names so reseeding converges instead of duplicating.

use chrono::Utc;
use clap::Parser;
use color_eyre::eyre::Result;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};
use uuid::Uuid;

use chasti_backend::domain::catalog::{Brand, BrandDraft, Category, CategoryDraft, Product, ProductDraft};
use chasti_backend::domain::money::Money;
use chasti_backend::domain::vehicles::{Fuel, VehicleBrand, VehicleEngine, VehicleModel};
use chasti_backend::outbound::persistence::{
    DbPool, DieselSeeder, PoolConfig, run_pending_migrations,
};

/// Seed the demo catalog into the configured database.
#[derive(Debug, Parser)]
#[command(name = "seed", version)]
struct Settings {
    /// PostgreSQL connection string.
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,
}

/// Stable id for a seeded entity, derived from its name.
fn stable_id(tag: &str) -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_OID, tag.as_bytes())
}

fn brand(slug: &str, name: &str, country: &str) -> Result<Brand> {
    Ok(Brand::new(BrandDraft {
        id: stable_id(&format!("brand:{slug}")),
        slug: slug.to_owned(),
        name: name.to_owned(),
        logo_url: None,
        country: Some(country.to_owned()),
    })?)
}

fn category(slug: &str, name: &str, parent: Option<&str>, position: i32) -> Result<Category> {
    Ok(Category::new(CategoryDraft {
        id: stable_id(&format!("category:{slug}")),
        slug: slug.to_owned(),
        name: name.to_owned(),
        parent_id: parent.map(|parent_slug| stable_id(&format!("category:{parent_slug}"))),
        position,
    })?)
}

#[expect(clippy::too_many_arguments, reason = "flat seed data reads best inline")]
fn product(
    slug: &str,
    sku: &str,
    name: &str,
    brand_slug: &str,
    category_slug: &str,
    price_minor: i64,
    stock: i32,
    oem_refs: &[&str],
) -> Result<Product> {
    let now = Utc::now();
    Ok(Product::new(ProductDraft {
        id: stable_id(&format!("product:{slug}")),
        slug: slug.to_owned(),
        sku: sku.to_owned(),
        name: name.to_owned(),
        description: format!("{name} for common Bulgarian-market fitments."),
        brand_id: stable_id(&format!("brand:{brand_slug}")),
        category_id: stable_id(&format!("category:{category_slug}")),
        price: Money::from_minor(price_minor)?,
        compare_at: None,
        stock,
        image_urls: vec![format!("https://cdn.chasti.example/products/{slug}.jpg")],
        oem_refs: oem_refs.iter().map(|oem| (*oem).to_owned()).collect(),
        created_at: now,
        updated_at: now,
    })?)
}

/// Application bootstrap.
#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let _ = fmt().with_env_filter(EnvFilter::from_default_env()).try_init();

    let settings = Settings::parse();
    let applied = tokio::task::spawn_blocking({
        let database_url = settings.database_url.clone();
        move || run_pending_migrations(&database_url)
    })
    .await??;
    info!(applied, "database migrations up to date");

    let pool = DbPool::new(PoolConfig::new(settings.database_url.clone())).await?;
    let seeder = DieselSeeder::new(pool);

    for item in [
        brand("bosch", "Bosch", "Germany")?,
        brand("febi", "Febi Bilstein", "Germany")?,
        brand("trw", "TRW", "Germany")?,
    ] {
        seeder.upsert_brand(&item).await?;
    }

    for item in [
        category("braking", "Braking", None, 0)?,
        category("filters", "Filters", None, 1)?,
        category("brake-pads", "Brake pads", Some("braking"), 0)?,
        category("brake-discs", "Brake discs", Some("braking"), 1)?,
        category("oil-filters", "Oil filters", Some("filters"), 0)?,
    ] {
        seeder.upsert_category(&item).await?;
    }

    let products = [
        product(
            "brake-pads-front-golf-5",
            "BP-0986-4612",
            "Front brake pads",
            "bosch",
            "brake-pads",
            5_990,
            24,
            &["1K0-698-151"],
        )?,
        product(
            "brake-disc-front-golf-5",
            "BD-0986-AB19",
            "Front brake disc 288mm",
            "trw",
            "brake-discs",
            8_450,
            16,
            &["1K0-615-301"],
        )?,
        product(
            "oil-filter-tdi",
            "OF-FEBI-32910",
            "Oil filter 1.9/2.0 TDI",
            "febi",
            "oil-filters",
            1_290,
            80,
            &["071-115-562C"],
        )?,
    ];
    for item in &products {
        seeder.upsert_product(item).await?;
    }

    let vw = VehicleBrand::new(
        stable_id("vehicle-brand:vw"),
        "vw".to_owned(),
        "Volkswagen".to_owned(),
    )?;
    seeder.upsert_vehicle_brand(&vw).await?;

    let golf5 = VehicleModel::new(
        stable_id("vehicle-model:golf-5"),
        vw.id,
        "golf-5".to_owned(),
        "Golf V".to_owned(),
        2003,
        Some(2009),
    )?;
    seeder.upsert_vehicle_model(&golf5).await?;

    let engines = [
        VehicleEngine::new(
            stable_id("engine:golf-5:bkd"),
            golf5.id,
            "BKD".to_owned(),
            "2.0 TDI 140".to_owned(),
            Fuel::Diesel,
            103,
            2003,
            Some(2008),
        )?,
        VehicleEngine::new(
            stable_id("engine:golf-5:bse"),
            golf5.id,
            "BSE".to_owned(),
            "1.6 MPI 102".to_owned(),
            Fuel::Petrol,
            75,
            2005,
            Some(2008),
        )?,
    ];
    for engine in &engines {
        seeder.upsert_vehicle_engine(engine).await?;
    }

    let engine_ids: Vec<Uuid> = engines.iter().map(|engine| engine.id).collect();
    for item in &products {
        seeder.set_fitments(item.id(), &engine_ids).await?;
    }

    info!("seeded demo catalog");
    Ok(())
}
