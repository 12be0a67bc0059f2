use mybar_core::{
	actions::PendingActionKind,
	domain::{BarItemCategory, RemovedCocktail},
	notifications::NotificationKind,
	remote::{MyBarDto, RemovedCocktailDto},
	sync::SyncActor,
};

use std::time::Duration;

use chrono::Utc;
use pretty_assertions::assert_eq;
use tracing_test::traced_test;
use uuid::Uuid;

mod common;

use common::{bar_item, cocktail_dto, offline, server_error, session, Call};

async fn pending(h: &common::SessionHarness, kind: PendingActionKind) -> usize {
	h.session.pending_counts().await.unwrap()[&kind]
}

#[tokio::test]
#[traced_test]
async fn mutations_are_pushed_right_away() {
	let h = session().await;

	let item = h.session.add_bar_item("Gin", None).await.unwrap();

	assert_eq!(item.category, BarItemCategory::Liquor);
	assert_eq!(h.remote.calls(), vec![Call::AddBarItem("Gin".to_string())]);
	assert_eq!(pending(&h, PendingActionKind::AddBarItem).await, 0);
	assert_eq!(h.session.current_bar().await.unwrap().items, vec![item]);
}

#[tokio::test]
#[traced_test]
async fn offline_mutations_stay_queued_without_an_error_toast() {
	let h = session().await;
	h.remote
		.fail_on(Call::AddFavorite("negroni".to_string()), offline());

	h.session.add_favorite("negroni").await.unwrap();

	assert_eq!(pending(&h, PendingActionKind::AddFavorite).await, 1);
	assert!(h.session.notifier().get_notifications().await.is_empty());
	assert!(h
		.session
		.current_bar()
		.await
		.unwrap()
		.is_favorite("negroni"));

	h.remote.clear_failures();
	let report = h.session.sync_all().await;

	assert!(report.is_success());
	assert_eq!(report.sent(), 1);
	assert_eq!(pending(&h, PendingActionKind::AddFavorite).await, 0);
}

#[tokio::test]
#[traced_test]
async fn server_rejections_are_reported() {
	let h = session().await;
	h.remote
		.fail_on(Call::DeleteBarItem("Campari".to_string()), server_error());

	h.session.delete_bar_item("Campari").await.unwrap();

	let notifications = h.session.notifier().get_notifications().await;
	assert_eq!(notifications.len(), 1);
	assert_eq!(notifications[0].kind, NotificationKind::Error);
	assert_eq!(pending(&h, PendingActionKind::DeleteBarItem).await, 1);
}

#[tokio::test]
#[traced_test]
async fn hidden_cocktails_are_filtered_until_restored() {
	let h = session().await;
	let a = cocktail_dto("aviation");
	let b = cocktail_dto("bramble");
	h.remote.set_catalog(vec![a.clone(), b.clone()]);

	h.session.fetch_catalog().await.unwrap();
	assert_eq!(h.session.cocktails().await.unwrap().len(), 2);

	h.session
		.hide_cocktail(RemovedCocktail::now(a.id.to_string(), "Aviation", "house"))
		.await
		.unwrap();

	let visible = h.session.cocktails().await.unwrap();
	assert_eq!(visible.len(), 1);
	assert_eq!(visible[0].id, b.id);

	h.session.restore_cocktail(&a.id.to_string()).await.unwrap();
	h.session.fetch_catalog().await.unwrap();
	assert_eq!(h.session.cocktails().await.unwrap().len(), 2);

	assert!(h
		.remote
		.calls()
		.contains(&Call::DeleteRemoved(a.id.to_string())));
}

#[tokio::test]
#[traced_test]
async fn sign_in_replaces_the_bar_with_the_server_copy() {
	let h = session().await;
	let other = Uuid::new_v4();
	let hidden = Uuid::new_v4().to_string();

	h.remote.set_my_bar(MyBarDto {
		id: Uuid::new_v4(),
		user_id: other,
		bar_items: vec![bar_item("gin")],
		favorite_cocktails: vec!["negroni".to_string(), "negroni".to_string()],
		deleted_cocktails: vec![RemovedCocktailDto {
			id: hidden.clone(),
			name: "Zombie".to_string(),
			creator: "house".to_string(),
			date: Utc::now(),
		}],
	});

	let bar = h.session.sign_in(other).await.unwrap();

	assert_eq!(bar.owner, Some(other));
	assert_eq!(bar.items.len(), 1);
	assert_eq!(bar.favorites, vec!["negroni".to_string()]);
	assert_eq!(bar.removed[0].id, hidden);
	assert_eq!(h.session.current_bar().await.unwrap(), bar);

	let guest = h.session.sign_out().await.unwrap();
	assert!(guest.is_guest());
	assert!(h.session.current_bar().await.unwrap().is_guest());
}

#[tokio::test]
#[traced_test]
async fn deleting_the_current_user_bar_falls_back_to_guest() {
	let h = session().await;

	h.session.delete_user_bar(h.user_id).await.unwrap();

	assert!(h.session.current_bar().await.unwrap().is_guest());
}

#[tokio::test]
#[traced_test]
async fn sync_actor_drains_in_the_background() {
	let h = session().await;
	h.remote.fail_on(Call::AddBarItem("Gin".to_string()), offline());

	h.session.add_bar_item("Gin", None).await.unwrap();
	assert_eq!(pending(&h, PendingActionKind::AddBarItem).await, 1);

	h.remote.clear_failures();
	h.remote.set_catalog(vec![cocktail_dto("aviation")]);

	let actor = SyncActor::new(h.session.clone(), Duration::from_secs(3600));
	let cancel = actor.cancellation_token();
	let handle = actor.spawn();

	tokio::time::timeout(Duration::from_secs(5), async {
		while pending(&h, PendingActionKind::AddBarItem).await > 0
			|| h.session.cocktails().await.unwrap().is_empty()
		{
			tokio::time::sleep(Duration::from_millis(10)).await;
		}
	})
	.await
	.unwrap();

	cancel.cancel();
	handle.await.unwrap();

	assert!(logs_contain("Sync actor stopped;"));
}

#[tokio::test]
#[traced_test]
async fn unreachable_server_skips_the_pass() {
	let h = session().await;
	h.remote.set_reachable(false);

	assert!(h.session.run_sync_pass().await.is_none());
	assert!(h.remote.calls().is_empty());
}

#[tokio::test]
#[traced_test]
async fn cocktail_images_are_loaded_on_demand() {
	let h = session().await;
	let mut a = cocktail_dto("aviation");
	a.image_url = Some("/Images/aviation.jpg".to_string());
	let b = cocktail_dto("bramble");
	h.remote.set_catalog(vec![a.clone(), b.clone()]);
	h.remote.set_image("/Images/aviation.jpg", b"violet");

	h.session.fetch_catalog().await.unwrap();

	assert_eq!(
		h.session.cocktail_image(a.id).await.unwrap().as_deref(),
		Some(&b"violet"[..])
	);
	assert_eq!(h.session.cocktail_image(b.id).await.unwrap(), None);
}
