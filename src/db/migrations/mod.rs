use anyhow::Result;
use sqlx::PgPool;
use tracing::info;

/// Create the dashboard schema. Statements are idempotent so re-running on
/// startup is safe.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS cameras (
            id BIGSERIAL PRIMARY KEY,
            name VARCHAR(255) NOT NULL,
            location VARCHAR(255) NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS incidents (
            id BIGSERIAL PRIMARY KEY,
            camera_id BIGINT NOT NULL REFERENCES cameras(id),
            kind VARCHAR(255) NOT NULL,
            ts_start TIMESTAMP NOT NULL,
            ts_end TIMESTAMP NOT NULL,
            thumbnail_url TEXT NOT NULL,
            resolved BOOLEAN NOT NULL DEFAULT false
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_incidents_ts_start ON incidents (ts_start DESC)
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Insert the demo cameras and incidents if no cameras exist yet.
///
/// The count guard keeps this callable on every startup without duplicating
/// rows.
pub async fn seed_if_empty(pool: &PgPool) -> Result<()> {
    let camera_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cameras")
        .fetch_one(pool)
        .await?;

    if camera_count > 0 {
        return Ok(());
    }

    info!("Seeding demo cameras and incidents");

    let cameras = [
        ("Shop Floor", "Main retail area"),
        ("Vault", "Secure storage room"),
        ("Entrance", "Main building entrance"),
        ("Parking Lot", "External parking area"),
        ("Loading Dock", "Goods receiving area"),
    ];

    for (name, location) in cameras {
        sqlx::query("INSERT INTO cameras (name, location) VALUES ($1, $2)")
            .bind(name)
            .bind(location)
            .execute(pool)
            .await?;
    }

    let incidents: [(i64, &str, &str, &str, &str, bool); 15] = [
        (
            1,
            "Unauthorized Access",
            "2024-01-15 02:15:00",
            "2024-01-15 02:18:00",
            "https://images.unsplash.com/photo-1557804506-669a67965ba0?w=400&h=300&fit=crop",
            false,
        ),
        (
            3,
            "Face Recognised",
            "2024-01-15 08:30:00",
            "2024-01-15 08:32:00",
            "https://images.unsplash.com/photo-1560472354-b33ff0c44a43?w=400&h=300&fit=crop",
            false,
        ),
        (
            2,
            "Gun Threat",
            "2024-01-15 14:45:00",
            "2024-01-15 14:47:00",
            "https://images.unsplash.com/photo-1558618666-fcd25c85cd64?w=400&h=300&fit=crop",
            false,
        ),
        (
            1,
            "Suspicious Activity",
            "2024-01-15 16:20:00",
            "2024-01-15 16:25:00",
            "https://images.unsplash.com/photo-1574717024653-61fd2cf4d44d?w=400&h=300&fit=crop",
            false,
        ),
        (
            4,
            "Unauthorized Access",
            "2024-01-15 19:10:00",
            "2024-01-15 19:12:00",
            "https://images.unsplash.com/photo-1586953208448-b95a79798f07?w=400&h=300&fit=crop",
            false,
        ),
        (
            3,
            "Face Recognised",
            "2024-01-15 21:35:00",
            "2024-01-15 21:36:00",
            "https://images.unsplash.com/photo-1551836022-deb4988cc6c0?w=400&h=300&fit=crop",
            true,
        ),
        (
            5,
            "Suspicious Activity",
            "2024-01-15 23:45:00",
            "2024-01-15 23:50:00",
            "https://images.unsplash.com/photo-1557804506-669a67965ba0?w=400&h=300&fit=crop",
            false,
        ),
        (
            2,
            "Gun Threat",
            "2024-01-16 01:20:00",
            "2024-01-16 01:23:00",
            "https://images.unsplash.com/photo-1560472354-b33ff0c44a43?w=400&h=300&fit=crop",
            false,
        ),
        (
            1,
            "Unauthorized Access",
            "2024-01-16 03:15:00",
            "2024-01-16 03:18:00",
            "https://images.unsplash.com/photo-1558618666-fcd25c85cd64?w=400&h=300&fit=crop",
            false,
        ),
        (
            4,
            "Face Recognised",
            "2024-01-16 09:30:00",
            "2024-01-16 09:31:00",
            "https://images.unsplash.com/photo-1574717024653-61fd2cf4d44d?w=400&h=300&fit=crop",
            true,
        ),
        (
            3,
            "Suspicious Activity",
            "2024-01-16 12:45:00",
            "2024-01-16 12:48:00",
            "https://images.unsplash.com/photo-1586953208448-b95a79798f07?w=400&h=300&fit=crop",
            false,
        ),
        (
            5,
            "Gun Threat",
            "2024-01-16 15:20:00",
            "2024-01-16 15:22:00",
            "https://images.unsplash.com/photo-1551836022-deb4988cc6c0?w=400&h=300&fit=crop",
            false,
        ),
        (
            2,
            "Unauthorized Access",
            "2024-01-16 18:10:00",
            "2024-01-16 18:13:00",
            "https://images.unsplash.com/photo-1557804506-669a67965ba0?w=400&h=300&fit=crop",
            false,
        ),
        (
            1,
            "Face Recognised",
            "2024-01-16 20:25:00",
            "2024-01-16 20:26:00",
            "https://images.unsplash.com/photo-1560472354-b33ff0c44a43?w=400&h=300&fit=crop",
            false,
        ),
        (
            4,
            "Suspicious Activity",
            "2024-01-16 22:40:00",
            "2024-01-16 22:44:00",
            "https://images.unsplash.com/photo-1558618666-fcd25c85cd64?w=400&h=300&fit=crop",
            false,
        ),
    ];

    for (camera_id, kind, ts_start, ts_end, thumbnail_url, resolved) in incidents {
        sqlx::query(
            r#"
            INSERT INTO incidents (camera_id, kind, ts_start, ts_end, thumbnail_url, resolved)
            VALUES ($1, $2, $3::timestamp, $4::timestamp, $5, $6)
            "#,
        )
        .bind(camera_id)
        .bind(kind)
        .bind(ts_start)
        .bind(ts_end)
        .bind(thumbnail_url)
        .bind(resolved)
        .execute(pool)
        .await?;
    }

    info!("Seed data inserted");

    Ok(())
}
