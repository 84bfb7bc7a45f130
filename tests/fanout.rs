//! Aggregator and resolver behaviour against an in-memory inventory

mod common;

use common::FakeInventory;
use gcp_inventory::gcp::Inventory;
use gcp_inventory::resource::{
    list_resources, resolve_resource, Resource, ResourceFilter, ResourceKind,
};
use std::sync::Arc;
use std::time::Duration;

const DEADLINE: Duration = Duration::from_secs(5);

fn inventory(fake: FakeInventory) -> Arc<dyn Inventory> {
    Arc::new(fake)
}

fn names(resources: &[Resource]) -> Vec<&str> {
    let mut names: Vec<&str> = resources.iter().map(|r| r.name.as_str()).collect();
    names.sort();
    names
}

mod listing {
    use super::*;

    #[tokio::test]
    async fn test_region_filter_scenario() {
        let inv = inventory(FakeInventory::scenario());
        let filter = ResourceFilter::new(Some("us-central1"), None);

        let listing = list_resources(&inv, &filter, DEADLINE).await.unwrap();

        assert_eq!(listing.resources.len(), 1);
        let web = &listing.resources[0];
        assert_eq!(web.name, "web-1");
        assert_eq!(web.zone, "us-central1-a");
        assert_eq!(web.kind, ResourceKind::Instance);
        assert_eq!(web.status, "RUNNING");
        assert_eq!(web.created_at, "2024-05-01");
        assert!(listing.failures.is_empty());
        assert!(!listing.timed_out);
    }

    #[tokio::test]
    async fn test_type_filter_scenario() {
        let inv = inventory(FakeInventory::scenario());
        let filter = ResourceFilter::new(None, Some(ResourceKind::Disk));

        let listing = list_resources(&inv, &filter, DEADLINE).await.unwrap();

        assert_eq!(listing.resources.len(), 1);
        let data = &listing.resources[0];
        assert_eq!(data.name, "data-1");
        assert_eq!(data.zone, "europe-west1-b");
        assert_eq!(data.kind, ResourceKind::Disk);
        assert_eq!(data.status, "READY");
        assert!(data.addresses.is_empty());
    }

    #[tokio::test]
    async fn test_no_filter_returns_everything() {
        let inv = inventory(
            FakeInventory::scenario()
                .with_instance("europe-west1-b", "web-2", "TERMINATED")
                .with_zone("asia-east1-a"),
        );

        let listing = list_resources(&inv, &ResourceFilter::default(), DEADLINE)
            .await
            .unwrap();

        assert_eq!(names(&listing.resources), vec!["data-1", "web-1", "web-2"]);
    }

    #[tokio::test]
    async fn test_order_within_zone_is_preserved() {
        let inv = inventory(
            FakeInventory::default()
                .with_instance("us-east1-b", "c", "RUNNING")
                .with_instance("us-east1-b", "a", "RUNNING")
                .with_instance("us-east1-b", "b", "RUNNING"),
        );
        let filter = ResourceFilter::new(None, Some(ResourceKind::Instance));

        let listing = list_resources(&inv, &filter, DEADLINE).await.unwrap();

        let order: Vec<&str> = listing.resources.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(order, vec!["c", "a", "b"]);
    }

    #[tokio::test]
    async fn test_zone_enumeration_failure_is_fatal() {
        let inv = inventory(FakeInventory::scenario().without_zones());

        let err = list_resources(&inv, &ResourceFilter::default(), DEADLINE)
            .await
            .unwrap_err();

        assert!(format!("{:#}", err).contains("503"));
    }

    #[tokio::test]
    async fn test_failing_zone_kind_is_absorbed() {
        let inv = inventory(
            FakeInventory::scenario()
                .with_disk("us-central1-a", "boot-1", "READY")
                .failing("us-central1-a", ResourceKind::Instance),
        );

        let listing = list_resources(&inv, &ResourceFilter::default(), DEADLINE)
            .await
            .unwrap();

        // The disk listing of the same zone still contributes
        assert_eq!(names(&listing.resources), vec!["boot-1", "data-1"]);
        assert_eq!(listing.failures.len(), 1);
        assert_eq!(listing.failures[0].zone, "us-central1-a");
        assert_eq!(listing.failures[0].kind, ResourceKind::Instance);
        assert!(listing.failures[0].message.contains("503"));
    }

    #[tokio::test]
    async fn test_type_filter_skips_other_kind_entirely() {
        let inv = inventory(
            FakeInventory::scenario().failing("us-central1-a", ResourceKind::Instance),
        );
        let filter = ResourceFilter::new(None, Some(ResourceKind::Disk));

        let listing = list_resources(&inv, &filter, DEADLINE).await.unwrap();

        assert!(listing.failures.is_empty());
        assert_eq!(names(&listing.resources), vec!["data-1"]);
    }

    #[tokio::test]
    async fn test_deadline_returns_partial_listing() {
        let inv = inventory(
            FakeInventory::scenario().slow("europe-west1-b", Duration::from_secs(30)),
        );

        let listing = list_resources(
            &inv,
            &ResourceFilter::default(),
            Duration::from_millis(200),
        )
        .await
        .unwrap();

        assert!(listing.timed_out);
        assert_eq!(names(&listing.resources), vec!["web-1"]);
    }
}

mod resolving {
    use super::*;

    #[tokio::test]
    async fn test_resolves_single_instance() {
        let inv = inventory(FakeInventory::scenario());

        let resolution = resolve_resource(&inv, "web-1", DEADLINE).await.unwrap();

        assert_eq!(resolution.resources.len(), 1);
        assert_eq!(resolution.resources[0].kind, ResourceKind::Instance);
        assert_eq!(resolution.resources[0].zone, "us-central1-a");
        assert!(!resolution.is_not_found());
    }

    #[tokio::test]
    async fn test_nonexistent_is_not_found() {
        let inv = inventory(FakeInventory::scenario());

        let resolution = resolve_resource(&inv, "nonexistent", DEADLINE).await.unwrap();

        assert!(resolution.is_not_found());
        assert!(resolution.failures.is_empty());
    }

    #[tokio::test]
    async fn test_instance_and_disk_with_same_name() {
        let inv = inventory(
            FakeInventory::scenario().with_disk("asia-east1-a", "web-1", "READY"),
        );

        let resolution = resolve_resource(&inv, "web-1", DEADLINE).await.unwrap();

        let kinds: Vec<ResourceKind> = resolution.resources.iter().map(|r| r.kind).collect();
        assert_eq!(kinds, vec![ResourceKind::Instance, ResourceKind::Disk]);
        assert_eq!(resolution.resources[1].zone, "asia-east1-a");
    }

    #[tokio::test]
    async fn test_first_match_per_kind_wins() {
        let zones = ["us-central1-a", "us-central1-b", "us-east1-b", "europe-west1-b"];
        let fake = zones
            .iter()
            .fold(FakeInventory::default(), |fake, zone| {
                fake.with_instance(zone, "dup", "RUNNING")
            });
        let inv = inventory(fake);

        for _ in 0..20 {
            let resolution = resolve_resource(&inv, "dup", DEADLINE).await.unwrap();
            assert_eq!(resolution.resources.len(), 1);
            assert!(zones.contains(&resolution.resources[0].zone.as_str()));
        }
    }

    #[tokio::test]
    async fn test_lookup_errors_are_not_fatal() {
        let inv = inventory(
            FakeInventory::scenario()
                .failing("europe-west1-b", ResourceKind::Instance)
                .failing("europe-west1-b", ResourceKind::Disk),
        );

        let resolution = resolve_resource(&inv, "web-1", DEADLINE).await.unwrap();

        assert_eq!(resolution.resources.len(), 1);
        assert_eq!(resolution.failures.len(), 2);
    }

    #[tokio::test]
    async fn test_zone_enumeration_failure_is_fatal() {
        let inv = inventory(FakeInventory::scenario().without_zones());
        assert!(resolve_resource(&inv, "web-1", DEADLINE).await.is_err());
    }

    #[tokio::test]
    async fn test_record_with_other_name_is_dropped() {
        let inv = inventory(
            FakeInventory::scenario()
                .ignoring_names("us-central1-a", ResourceKind::Instance)
                .ignoring_names("europe-west1-b", ResourceKind::Disk),
        );

        let resolution = resolve_resource(&inv, "web-2", DEADLINE).await.unwrap();
        assert!(resolution.is_not_found());
        assert!(resolution.failures.is_empty());

        let resolution = resolve_resource(&inv, "data-1", DEADLINE).await.unwrap();
        assert_eq!(names(&resolution.resources), vec!["data-1"]);
    }

    #[tokio::test]
    async fn test_invalid_names_are_never_looked_up() {
        // Zone enumeration fails, so any upstream call would surface as an error
        let inv = inventory(
            FakeInventory::scenario()
                .ignoring_names("us-central1-a", ResourceKind::Instance)
                .without_zones(),
        );

        for id in [".", "..", "a/b", "web-1/..", " web-1", "web-1 ", "WEB-1"] {
            let resolution = resolve_resource(&inv, id, DEADLINE).await.unwrap();
            assert!(resolution.is_not_found(), "{id:?} resolved");
            assert!(resolution.failures.is_empty());
        }
    }

    #[tokio::test]
    async fn test_deadline_keeps_recorded_matches() {
        let inv = inventory(
            FakeInventory::scenario()
                .with_disk("asia-east1-a", "web-1", "READY")
                .slow("asia-east1-a", Duration::from_secs(30)),
        );

        let resolution = resolve_resource(&inv, "web-1", Duration::from_millis(200))
            .await
            .unwrap();

        assert!(resolution.timed_out);
        assert_eq!(resolution.resources.len(), 1);
        assert_eq!(resolution.resources[0].kind, ResourceKind::Instance);
    }
}
