#![forbid(unsafe_code)]

//! Integration tests: package screen mounted over an in-memory store.
//!
//! # Invariants
//!
//! 1. **Render on change**: every store write that changes the package
//!    paints exactly one new frame.
//! 2. **Quiet after unmount**: writes after `on_unmount()` paint nothing.
//! 3. **Navigation rebinds**: a followed route change repaints with the new
//!    package and leaves a single store subscription.
//! 4. **Failures only replace empty screens**: a store failure while a
//!    package is shown keeps the sheet.
//!
//! Run: `cargo test -p recbind-view --test package_screen`

use pretty_assertions::assert_eq;
use recbind_core::{BindingPolicy, CompositeKeyResolver, Record, RouteParams};
use recbind_runtime::{Activation, BindPhase, MemoryStore, RouteContext, StoreError};
use recbind_view::{Frame, PackageScreen};

// =============================================================================
// Fixtures
// =============================================================================

const CATALOG: &str = r#"[
    {
        "id": {"name": "lodash", "version": "4.17.0"},
        "name": "lodash",
        "description": "Lodash modular utilities."
    },
    {
        "id": {"name": "lodash", "version": "4.17.21"},
        "name": "lodash",
        "description": "Lodash modular utilities, patched."
    }
]"#;

fn store() -> MemoryStore {
    let store = MemoryStore::new();
    store
        .load_catalog_json(CATALOG, &CompositeKeyResolver::package())
        .expect("catalog fixture parses");
    store
}

fn route(version: &str) -> RouteParams {
    RouteParams::new()
        .with("name", "lodash")
        .with("version", version)
}

fn screen(store: &MemoryStore, ctx: &RouteContext) -> PackageScreen<MemoryStore> {
    PackageScreen::new(
        store.clone(),
        CompositeKeyResolver::package(),
        ctx.clone(),
        BindingPolicy::default(),
    )
}

fn description(frame: &Frame) -> Option<&str> {
    match frame {
        Frame::Sheet(sheet) => sheet.description.as_deref(),
        _ => None,
    }
}

// =============================================================================
// Rendering
// =============================================================================

#[test]
fn mounted_screen_renders_package_sheet() {
    let store = store();
    let ctx = RouteContext::new(route("4.17.0"));
    let mut screen = screen(&store, &ctx);

    assert_eq!(screen.on_mount(), Ok(Activation::Bound));
    let frame = screen.current_frame().expect("first frame");
    let expected = "\
Package Details

Lodash modular utilities.

[NEW CAMPAIGN] -> new-campaign?name=lodash&version=4.17.0

| lodash      |                                      |
|-------------|--------------------------------------|
| description | Lodash modular utilities.            |
| id          | {\"name\":\"lodash\",\"version\":\"4.17.0\"} |
| name        | lodash                               |
";
    assert_eq!(frame.render_text(), expected);
}

#[test]
fn store_changes_repaint_once_each() {
    let store = store();
    let ctx = RouteContext::new(route("4.17.0"));
    let mut screen = screen(&store, &ctx);
    screen.on_mount().unwrap();
    assert_eq!(screen.render_count(), 1);

    let key = "lodash/4.17.0".into();
    store.update(&key, |r| r.set("description", "Now with fewer bugs."));
    assert_eq!(screen.render_count(), 2);
    assert_eq!(
        description(&screen.current_frame().unwrap()),
        Some("Now with fewer bugs.")
    );

    // Duplicate write with identical data.
    let same = store.get(&key).unwrap();
    store.insert(same);
    assert_eq!(screen.render_count(), 2);
}

#[test]
fn unmount_stops_rendering_and_releases_store() {
    let store = store();
    let ctx = RouteContext::new(route("4.17.0"));
    let mut screen = screen(&store, &ctx);
    screen.on_mount().unwrap();
    screen.on_unmount();

    assert_eq!(store.subscriber_count(), 0);
    assert_eq!(screen.controller().phase(), BindPhase::Inactive);
    let painted = screen.render_count();
    store.update(&"lodash/4.17.0".into(), |r| r.set("description", "late"));
    assert_eq!(screen.render_count(), painted);
}

#[test]
fn missing_package_paints_failure() {
    let store = store();
    let ctx = RouteContext::new(route("0.0.1"));
    let mut screen = screen(&store, &ctx);

    assert!(screen.on_mount().is_err());
    assert_eq!(
        screen.frames(),
        [Frame::Failed(
            "no record found for key `lodash/0.0.1`".to_owned()
        )]
    );
    assert_eq!(
        screen.current_frame().unwrap().render_text(),
        "Package Details\n\nno record found for key `lodash/0.0.1`\n"
    );
}

#[test]
fn missing_route_param_paints_failure() {
    let store = store();
    let ctx = RouteContext::new(RouteParams::new().with("name", "lodash"));
    let mut screen = screen(&store, &ctx);

    assert!(screen.on_mount().is_err());
    assert_eq!(
        screen.frames(),
        [Frame::Failed("missing route parameter `version`".to_owned())]
    );
}

#[test]
fn transient_store_failure_keeps_sheet() {
    let store = store();
    let ctx = RouteContext::new(route("4.17.0"));
    let mut screen = screen(&store, &ctx);
    screen.on_mount().unwrap();

    store.notify_error(
        &"lodash/4.17.0".into(),
        StoreError::Unavailable("stream dropped".into()),
    );

    assert_eq!(screen.render_count(), 1);
    assert!(matches!(screen.current_frame(), Some(Frame::Sheet(_))));
    assert!(screen.controller().last_error().is_some());
}

#[test]
fn deleted_package_paints_failure() {
    let store = store();
    let ctx = RouteContext::new(route("4.17.0"));
    let mut screen = screen(&store, &ctx);
    screen.on_mount().unwrap();

    store.remove(&"lodash/4.17.0".into());

    let frames = screen.frames();
    assert_eq!(frames.len(), 3);
    assert_eq!(frames[1], Frame::Empty);
    assert_eq!(
        frames[2],
        Frame::Failed("no record found for key `lodash/4.17.0`".to_owned())
    );
}

#[test]
fn followed_navigation_repaints_new_package() {
    let store = store();
    let ctx = RouteContext::new(route("4.17.0"));
    let mut screen = screen(&store, &ctx);
    screen.follow(&ctx);
    screen.on_mount().unwrap();

    ctx.set_param("version", "4.17.21");

    let frames = screen.frames();
    assert_eq!(frames.len(), 3);
    assert_eq!(description(&frames[0]), Some("Lodash modular utilities."));
    assert_eq!(frames[1], Frame::Empty, "old package cleared before rebind");
    assert_eq!(
        description(&frames[2]),
        Some("Lodash modular utilities, patched.")
    );
    assert_eq!(store.subscriber_count(), 1);
    assert_eq!(store.peak_subscriber_count(), 1);
}

#[test]
fn unmount_stops_following() {
    let store = store();
    let ctx = RouteContext::new(route("4.17.0"));
    let mut screen = screen(&store, &ctx);
    screen.follow(&ctx);
    screen.on_mount().unwrap();
    screen.on_unmount();

    ctx.set_param("version", "4.17.21");
    assert_eq!(store.subscriber_count(), 0);
    assert_eq!(screen.controller().key(), None);
}

#[test]
fn remount_binds_again() {
    let store = store();
    let ctx = RouteContext::new(route("4.17.0"));
    let mut screen = screen(&store, &ctx);
    screen.on_mount().unwrap();
    screen.on_unmount();
    assert_eq!(screen.on_mount(), Ok(Activation::Bound));
    assert_eq!(store.subscriber_count(), 1);
    assert!(matches!(screen.current_frame(), Some(Frame::Sheet(_))));
}

#[test]
fn catalog_records_keep_their_id_for_the_campaign_link() {
    let store = store();
    let record: Record = store.get(&"lodash/4.17.21".into()).unwrap();
    let link = recbind_view::new_campaign_route(&record).unwrap();
    assert_eq!(link.to_string(), "new-campaign?name=lodash&version=4.17.21");
}
