use crate::config::Config;
use mongodb::bson::doc;
use mongodb::options::IndexOptions;
use mongodb::{Client, Database, IndexModel};

pub async fn create_mongodb_client(config: &Config) -> Result<Database, anyhow::Error> {
    let client = Client::with_uri_str(&config.mongodb.uri).await?;
    let db = client.database(&config.mongodb.database);
    ensure_indexes(&db).await?;
    Ok(db)
}

/// Indexes the request path relies on: identity uniqueness, and the unique
/// compound pairs that make subscription/like toggles race-safe.
async fn ensure_indexes(db: &Database) -> Result<(), anyhow::Error> {
    let unique = || IndexOptions::builder().unique(true).build();

    db.collection::<mongodb::bson::Document>("users")
        .create_indexes(
            vec![
                IndexModel::builder()
                    .keys(doc! {"username": 1})
                    .options(unique())
                    .build(),
                IndexModel::builder()
                    .keys(doc! {"email": 1})
                    .options(unique())
                    .build(),
            ],
            None,
        )
        .await?;

    db.collection::<mongodb::bson::Document>("subscriptions")
        .create_indexes(
            vec![
                IndexModel::builder()
                    .keys(doc! {"subscriber": 1, "channel": 1})
                    .options(unique())
                    .build(),
                IndexModel::builder().keys(doc! {"channel": 1}).build(),
            ],
            None,
        )
        .await?;

    db.collection::<mongodb::bson::Document>("likes")
        .create_indexes(
            vec![
                IndexModel::builder()
                    .keys(doc! {"video": 1, "liked_by": 1})
                    .options(unique())
                    .build(),
                IndexModel::builder().keys(doc! {"video": 1}).build(),
            ],
            None,
        )
        .await?;

    db.collection::<mongodb::bson::Document>("videos")
        .create_indexes(
            vec![
                IndexModel::builder().keys(doc! {"owner": 1}).build(),
                IndexModel::builder().keys(doc! {"created_at": -1}).build(),
            ],
            None,
        )
        .await?;

    db.collection::<mongodb::bson::Document>("comments")
        .create_indexes(vec![IndexModel::builder().keys(doc! {"video": 1}).build()], None)
        .await?;

    db.collection::<mongodb::bson::Document>("tweets")
        .create_indexes(vec![IndexModel::builder().keys(doc! {"owner": 1}).build()], None)
        .await?;

    Ok(())
}
