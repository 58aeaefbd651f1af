//! Integration tests for tv shows and episodes.

mod common;

use std::net::SocketAddr;

use common::*;
use serde_json::Value;

async fn create_show(addr: SocketAddr, title: &str) -> Value {
    let form = reqwest::multipart::Form::new()
        .text("title", title.to_string())
        .text("description", "A show")
        .part("thumbnail", file_part(jpeg_bytes(), "poster.jpg"));
    let resp = post_form(addr, "/tv-shows", form).await;
    assert_eq!(resp.status(), 201);
    resp.json().await.unwrap()
}

fn episode_form(season: &str, number: &str) -> reqwest::multipart::Form {
    reqwest::multipart::Form::new()
        .text("title", format!("Episode {season}x{number}"))
        .text("description", "")
        .text("season", season.to_string())
        .text("number", number.to_string())
        .part("video", file_part(mp4_bytes(3000), "ep.mp4"))
}

#[tokio::test]
async fn create_show_and_add_episodes() {
    let (h, addr) = TestHarness::with_server(FakeProbe::Seconds(1800)).await;
    let show = create_show(addr, "The Show").await;
    let id = show["id"].as_str().unwrap();
    assert_eq!(show["title"], "The Show");

    for (s, n) in [("1", "2"), ("1", "1"), ("2", "1")] {
        let resp = post_form(addr, &format!("/tv-shows/{id}/episodes"), episode_form(s, n)).await;
        assert_eq!(resp.status(), 201);
        let ep: Value = resp.json().await.unwrap();
        assert_eq!(ep["season"].to_string(), s);
        assert_eq!(ep["number"].to_string(), n);
        assert!(ep["video_id"].as_str().is_some());
    }
    assert_eq!(h.count_rows("episodes"), 3);

    let content: Value = reqwest::get(format!("http://{addr}/contents/{id}"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(content["content_type"], "TV_SHOW");
    assert!(content.get("movie").is_none());
    let episodes = content["tv_show"]["episodes"].as_array().unwrap();
    let order: Vec<(u64, u64)> = episodes
        .iter()
        .map(|e| (e["season"].as_u64().unwrap(), e["number"].as_u64().unwrap()))
        .collect();
    assert_eq!(order, vec![(1, 1), (1, 2), (2, 1)]);
    assert_eq!(episodes[0]["video"]["duration"], 1800);
}

#[tokio::test]
async fn episode_video_streams() {
    let (_h, addr) = TestHarness::with_server(FakeProbe::Seconds(5)).await;
    let show = create_show(addr, "Streamable").await;
    let resp = post_form(
        addr,
        &format!("/tv-shows/{}/episodes", show["id"].as_str().unwrap()),
        episode_form("1", "1"),
    )
    .await;
    let ep: Value = resp.json().await.unwrap();

    let resp = reqwest::Client::new()
        .get(format!("http://{addr}/videos/{}/stream", ep["video_id"].as_str().unwrap()))
        .header("Range", "bytes=0-23")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 206);
    assert_eq!(resp.bytes().await.unwrap().as_ref(), &mp4_bytes(3000)[..24]);
}

#[tokio::test]
async fn duplicate_episode_is_409() {
    let (h, addr) = TestHarness::with_server(FakeProbe::Seconds(5)).await;
    let show = create_show(addr, "Dupes").await;
    let path = format!("/tv-shows/{}/episodes", show["id"].as_str().unwrap());

    assert_eq!(post_form(addr, &path, episode_form("1", "1")).await.status(), 201);
    let resp = post_form(addr, &path, episode_form("1", "1")).await;
    assert_eq!(resp.status(), 409);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "episode S01E01 already exists");

    assert_eq!(h.count_rows("episodes"), 1);
    assert_eq!(h.count_blobs("videos"), 1);
}

#[tokio::test]
async fn invalid_episode_numbers_are_422() {
    let (h, addr) = TestHarness::with_server(FakeProbe::Seconds(5)).await;
    let show = create_show(addr, "Numbers").await;
    let path = format!("/tv-shows/{}/episodes", show["id"].as_str().unwrap());

    let resp = post_form(addr, &path, episode_form("0", "1")).await;
    assert_eq!(resp.status(), 422);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "episode season must be a positive number");

    let resp = post_form(addr, &path, episode_form("one", "1")).await;
    assert_eq!(resp.status(), 422);

    assert_eq!(h.count_rows("episodes"), 0);
    assert_eq!(h.count_blobs("videos"), 0);
}

#[tokio::test]
async fn episodes_need_a_tv_show() {
    let (_h, addr) = TestHarness::with_server(FakeProbe::Seconds(5)).await;

    let movie = upload_movie(addr, mp4_bytes(2048)).await;
    let resp = post_form(
        addr,
        &format!("/tv-shows/{}/episodes", movie["id"].as_str().unwrap()),
        episode_form("1", "1"),
    )
    .await;
    assert_eq!(resp.status(), 422);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "content is not a tv show");

    let resp = post_form(
        addr,
        "/tv-shows/00000000-0000-4000-8000-000000000000/episodes",
        episode_form("1", "1"),
    )
    .await;
    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "content not found");
}

#[tokio::test]
async fn unknown_content_is_404() {
    let (_h, addr) = TestHarness::with_server(FakeProbe::Seconds(5)).await;
    let resp = reqwest::get(format!("http://{addr}/contents/not-a-uuid")).await.unwrap();
    assert_eq!(resp.status(), 404);
}
