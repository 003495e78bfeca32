use innerspace_db::{connect_from_config, migrations, AssetSeedInfo, DemoDataset, SqlAssetCatalog};

use crate::commands::{
    prepare, CommandResult, StepFailure, EXIT_DATABASE, EXIT_MIGRATION, EXIT_VERIFICATION,
};

pub fn run() -> CommandResult {
    let (config, runtime) = match prepare("seed") {
        Ok(prepared) => prepared,
        Err(result) => return result,
    };

    let result = runtime.block_on(async {
        let pool = connect_from_config(&config.database)
            .await
            .map_err(|error| ("db_connectivity", error.to_string(), EXIT_DATABASE))?;

        migrations::run_pending(&pool)
            .await
            .map_err(|error| ("migration", error.to_string(), EXIT_MIGRATION))?;

        let catalog = SqlAssetCatalog::new(pool.clone());
        let seed_result = DemoDataset::load(&catalog)
            .await
            .map_err(|error| ("seed_execution", error.to_string(), EXIT_MIGRATION))?;

        let verification = DemoDataset::verify(&catalog)
            .await
            .map_err(|error| ("seed_verification", error.to_string(), EXIT_VERIFICATION))?;

        let failed_checks = verification
            .checks
            .iter()
            .filter_map(|(check, passed)| (!passed).then_some(*check))
            .collect::<Vec<_>>();
        let run_result: Result<Vec<AssetSeedInfo>, StepFailure> = if verification.all_present {
            Ok(seed_result.assets_seeded)
        } else {
            Err(("seed_verification", verification_message(&failed_checks), EXIT_VERIFICATION))
        };

        pool.close().await;
        run_result
    });

    match result {
        Ok(assets) => CommandResult::success("seed", seed_summary(&assets)),
        Err(failure) => CommandResult::from_step("seed", failure),
    }
}

fn seed_summary(assets: &[AssetSeedInfo]) -> String {
    let lines = assets
        .iter()
        .map(|asset| {
            let visibility = if asset.discoverable { "discoverable" } else { "pending review" };
            format!("  - {}: {} in {} ({visibility})", asset.asset_id, asset.asset_type, asset.city)
        })
        .collect::<Vec<_>>();
    format!("demo dataset loaded ({} listings):\n{}", assets.len(), lines.join("\n"))
}

fn verification_message(failed_checks: &[&str]) -> String {
    if failed_checks.is_empty() {
        "Some seed data failed to load".to_string()
    } else {
        format!("Seed verification failed for checks: {}", failed_checks.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use innerspace_db::AssetSeedInfo;

    use super::{seed_summary, verification_message};

    #[test]
    fn verification_error_message_targets_failed_checks() {
        let message = verification_message(&["asset-demo-meeting-blr", "unapproved-asset-hidden"]);

        assert_eq!(
            message,
            "Seed verification failed for checks: asset-demo-meeting-blr, unapproved-asset-hidden"
        );
    }

    #[test]
    fn verification_error_message_falls_back_to_generic_when_no_labels() {
        assert_eq!(verification_message(&[]), "Some seed data failed to load");
    }

    #[test]
    fn summary_marks_pending_listings() {
        let summary = seed_summary(&[
            AssetSeedInfo {
                asset_id: "asset-demo-cabin-bom",
                asset_type: "cabin",
                city: "Mumbai",
                discoverable: true,
            },
            AssetSeedInfo {
                asset_id: "asset-demo-desk-pnq",
                asset_type: "dedicated_desk",
                city: "Pune",
                discoverable: false,
            },
        ]);

        assert!(summary.starts_with("demo dataset loaded (2 listings):"));
        assert!(summary.contains("  - asset-demo-cabin-bom: cabin in Mumbai (discoverable)"));
        assert!(
            summary.contains("  - asset-demo-desk-pnq: dedicated_desk in Pune (pending review)")
        );
    }
}
