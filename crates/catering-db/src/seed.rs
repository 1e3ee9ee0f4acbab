//! Meal-plan catalog seed.

use catering_core::Result;
use chrono::Utc;
use sea_query::{Alias, OnConflict, Query};
use sqlx::SqlitePool;

use crate::bind::build_query;
use crate::schema::MEAL_PLANS;
use crate::time::format_timestamp;

/// One catalog entry to upsert
#[derive(Debug, Clone, Copy)]
pub struct PlanSeed {
	pub id: &'static str,
	pub name: &'static str,
	pub price: i64,
	pub description: &'static str,
	pub details: &'static str,
	pub image: &'static str,
}

pub const MEAL_PLAN_CATALOG: &[PlanSeed] = &[
	PlanSeed {
		id: "plan-diet",
		name: "Diet Plan",
		price: 30000,
		description: "Fokus pada makanan rendah kalori, tinggi serat untuk penurunan berat badan yang efektif.",
		details: "Paket ini mencakup hidangan dengan porsi terkontrol, kaya sayuran segar dan protein tanpa lemak, dirancang untuk mendukung tujuan diet Anda. Ideal untuk mereka yang ingin mengelola berat badan tanpa mengorbankan rasa.",
		image: "/images/diet-plan.jpg",
	},
	PlanSeed {
		id: "plan-protein",
		name: "Protein Plan",
		price: 40000,
		description: "Tinggi protein untuk membangun dan memelihara massa otot, sempurna untuk gaya hidup aktif.",
		details: "Dirancang untuk atlet dan individu yang aktif, paket protein tinggi ini menyediakan sumber protein yang melimpah dari daging tanpa lemak, ikan, telur, dan legum. Mendukung pemulihan otot dan pertumbuhan.",
		image: "/images/protein-plan.jpg",
	},
	PlanSeed {
		id: "plan-royal",
		name: "Royal Plan",
		price: 60000,
		description: "Pilihan premium dengan bahan-bahan berkualitas tinggi dan hidangan eksotis.",
		details: "Nikmati pengalaman kuliner mewah dengan paket Royal kami. Menampilkan bahan-bahan pilihan, hidangan gourmet, dan kombinasi rasa yang unik. Cocok untuk Anda yang mencari kualitas dan kelezatan terbaik.",
		image: "/images/royal-plan.jpg",
	},
	PlanSeed {
		id: "plan-vegetarian",
		name: "Vegetarian Plan",
		price: 35000,
		description: "Pilihan hidangan nabati yang lezat dan bergizi, kaya akan serat dan vitamin.",
		details: "Paket Vegetarian kami menawarkan berbagai hidangan lezat dan bergizi sepenuhnya berbasis nabati. Dengan fokus pada sayuran segar, biji-bijian utuh, kacang-kacangan, dan buah-buahan, paket ini memastikan Anda mendapatkan semua nutrisi penting tanpa produk hewani. Sempurna untuk vegetarian atau mereka yang ingin mengurangi konsumsi daging.",
		image: "/images/vegetarian-plan.jpg",
	},
	PlanSeed {
		id: "plan-kids",
		name: "Kids Healthy Plan",
		price: 25000,
		description: "Makanan sehat dan menyenangkan khusus untuk anak-anak, dengan nutrisi seimbang.",
		details: "Dirancang khusus untuk kebutuhan gizi anak-anak yang sedang tumbuh. Paket Kids Healthy Plan kami menyajikan hidangan yang lezat, menarik, dan penuh nutrisi penting untuk mendukung perkembangan fisik dan mental mereka. Kami memastikan setiap porsi seimbang dan dibuat dengan bahan-bahan segar, bebas pengawet.",
		image: "/images/kids-plan.jpg",
	},
];

/// Upsert the catalog by id. Safe to run repeatedly; existing
/// subscriptions keep their references and their frozen prices.
pub async fn seed_meal_plans(pool: &SqlitePool) -> Result<usize> {
	let now = format_timestamp(Utc::now());
	let mut tx = pool.begin().await?;

	for plan in MEAL_PLAN_CATALOG {
		let stmt = Query::insert()
			.into_table(Alias::new(MEAL_PLANS))
			.columns([
				Alias::new("id"),
				Alias::new("name"),
				Alias::new("price"),
				Alias::new("description"),
				Alias::new("details"),
				Alias::new("image"),
				Alias::new("created_at"),
				Alias::new("updated_at"),
			])
			.values_panic([
				plan.id.into(),
				plan.name.into(),
				plan.price.into(),
				plan.description.into(),
				plan.details.into(),
				plan.image.into(),
				now.clone().into(),
				now.clone().into(),
			])
			.on_conflict(
				OnConflict::column(Alias::new("id"))
					.update_columns([
						Alias::new("name"),
						Alias::new("price"),
						Alias::new("description"),
						Alias::new("details"),
						Alias::new("image"),
						Alias::new("updated_at"),
					])
					.to_owned(),
			)
			.to_owned();

		let (sql, args) = build_query(&stmt)?;
		sqlx::query_with(&sql, args).execute(&mut *tx).await?;
	}

	tx.commit().await?;
	tracing::info!(plans = MEAL_PLAN_CATALOG.len(), "meal plan catalog seeded");
	Ok(MEAL_PLAN_CATALOG.len())
}
