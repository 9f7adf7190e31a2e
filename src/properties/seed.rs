//! Sample listings for demos.

use tracing::info;

use super::model::{NewProperty, Price};
use super::repository::PropertyRepository;
use super::writer::PropertyWriter;
use crate::error::Result;

fn sample_properties() -> Vec<NewProperty> {
    vec![
        NewProperty::new(
            "Modern Downtown Apartment",
            "Beautiful 2-bedroom apartment in the heart of downtown with city views.",
            Price::from_units(1250),
            "Downtown",
        ),
        NewProperty::new(
            "Cozy Suburban House",
            "Family-friendly 3-bedroom house with a large backyard and garage.",
            Price::from_units(1800),
            "Suburbia",
        ),
        NewProperty::new(
            "Luxury Waterfront Condo",
            "Stunning waterfront condominium with premium amenities and ocean views.",
            Price::from_units(3200),
            "Waterfront District",
        ),
        NewProperty::new(
            "Student-Friendly Studio",
            "Affordable studio apartment perfect for students, close to university.",
            Price::from_units(850),
            "University Area",
        ),
        NewProperty::new(
            "Executive Penthouse",
            "Exclusive penthouse with 360-degree city views and private terrace.",
            Price::from_units(5500),
            "Financial District",
        ),
    ]
}

/// Inserts each sample listing whose title is not taken yet, through the
/// write path so hooks run. Returns how many were created.
pub async fn seed_sample_properties(
    repository: &PropertyRepository,
    writer: &PropertyWriter,
) -> Result<usize> {
    let mut created = 0;
    for sample in sample_properties() {
        if repository.exists_with_title(&sample.title).await? {
            info!(title = %sample.title, "Property already exists");
            continue;
        }
        let property = writer.create(sample).await?;
        info!(id = property.id, title = %property.title, "Created property");
        created += 1;
    }

    info!(created, total = repository.count().await?, "Sample data ready");
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::repository::tests::memory_repository;

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let repository = memory_repository().await;
        let writer = PropertyWriter::new(repository.clone());

        assert_eq!(seed_sample_properties(&repository, &writer).await.unwrap(), 5);
        assert_eq!(seed_sample_properties(&repository, &writer).await.unwrap(), 0);
        assert_eq!(repository.count().await.unwrap(), 5);
    }
}
