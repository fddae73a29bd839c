//! Chat dispatch: authorization, replies, and the polling loop.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::sync::Mutex;
use std::time::Duration;

use seedhost::application::ports::UpdateBatch;
use seedhost::application::services::chat::ChatService;
use seedhost::application::services::daemon_connector::{DaemonConnector, HostSource};
use seedhost::application::services::host_acquisition::HostAcquisition;
use seedhost::domain::config::Secret;
use seedhost::domain::host::RunStatus;
use seedhost::domain::{
    AcquisitionPolicy, ChatConfig, ChatInfo, ControlPlaneConfig, DocumentRef, IncomingMessage,
};

use crate::mocks::{
    DaemonCall, FakeDaemon, PlaneCall, RecordingTransport, ScriptedControlPlane, ScriptedProbe,
    StaticPages, run,
};

const OWNER: i64 = 1001;
const STRANGER: i64 = 666;

fn chat_config() -> ChatConfig {
    ChatConfig {
        bot_token: Some(Secret::new("123:abc")),
        authorized_users: vec![OWNER],
    }
}

fn plane_config() -> ControlPlaneConfig {
    ControlPlaneConfig {
        api_url: "https://app.terraform.io/api/v2".to_string(),
        token: Secret::new("token"),
        workspace_id: "ws-abc".to_string(),
        workspace_name: "transmission".to_string(),
        organization_name: "acme".to_string(),
    }
}

fn text_from(chat_id: i64, text: &str) -> IncomingMessage {
    IncomingMessage {
        update_id: 1,
        chat: ChatInfo {
            id: chat_id,
            first_name: Some("Ada".to_string()),
            last_name: Some("Lovelace".to_string()),
            title: None,
        },
        text: Some(text.to_string()),
        document: None,
    }
}

/// Send `message` through a service wired to the given fakes and return
/// everything replied to the sender.
async fn exchange(
    message: &IncomingMessage,
    daemon: &FakeDaemon,
    transport: &RecordingTransport,
    pages: &StaticPages,
    plane: Option<&ScriptedControlPlane>,
) -> Vec<String> {
    let chat = chat_config();
    let cp_config = plane_config();
    let service = ChatService {
        transport,
        daemons: daemon,
        pages,
        control_plane: plane.map(|p| (p, &cp_config)),
        chat: &chat,
        download_dir: "/tmp/downloads",
    };
    service.handle(message).await.expect("replies sent");
    transport.replies_to(message.chat.id)
}

async fn reply_to(text: &str, daemon: &FakeDaemon) -> Vec<String> {
    let transport = RecordingTransport::new();
    let pages = StaticPages(None);
    exchange(&text_from(OWNER, text), daemon, &transport, &pages, None).await
}

#[tokio::test]
async fn test_handle_unauthorized_chat_gets_refusal_only() {
    let daemon = FakeDaemon::with_ids(&[1]);
    let transport = RecordingTransport::new();
    let pages = StaticPages(None);

    let replies = exchange(
        &text_from(STRANGER, "/list"),
        &daemon,
        &transport,
        &pages,
        None,
    )
    .await;

    assert_eq!(
        replies,
        vec![
            "Executing your command, please wait...".to_string(),
            "Sorry, this is a private bot".to_string(),
        ]
    );
    assert!(daemon.calls().is_empty());
}

#[tokio::test]
async fn test_handle_unrecognised_text_is_ignored() {
    let daemon = FakeDaemon::empty();
    assert!(reply_to("good morning", &daemon).await.is_empty());
}

#[tokio::test]
async fn test_handle_help_greets_by_full_name() {
    let replies = reply_to("/help", &FakeDaemon::empty()).await;
    assert_eq!(replies.len(), 2);
    assert!(replies[1].starts_with("Hello, Ada Lovelace \nWelcome"));
    assert!(replies[1].contains("/list_w_files"));
}

#[tokio::test]
async fn test_handle_list_formats_rows() {
    let replies = reply_to("/list", &FakeDaemon::with_ids(&[1, 2])).await;
    assert_eq!(
        replies[1],
        "Active torrents:\n#1 torrent-1 downloading 50.0\n#2 torrent-2 downloading 50.0\n"
    );
}

#[tokio::test]
async fn test_handle_list_empty() {
    let replies = reply_to("/list", &FakeDaemon::empty()).await;
    assert_eq!(replies[1], "There are no active torrents");
}

#[tokio::test]
async fn test_handle_list_with_files_includes_file_rows() {
    let replies = reply_to("/list_w_files", &FakeDaemon::with_ids(&[3])).await;
    assert_eq!(
        replies[1],
        "Active torrents:\n#3 torrent-3 downloading 50.0\n[0] file-0.mkv 1 MB\n[1] file-1.mkv 1 MB\n[2] file-2.mkv 1 MB\n"
    );
}

#[tokio::test]
async fn test_handle_add_magnet_uses_timestamped_dir() {
    let daemon = FakeDaemon::empty();
    let replies = reply_to("/add magnet:?xt=urn:btih:ABC", &daemon).await;

    assert_eq!(replies[1], "Torrent was successfully added with ID #42");
    let calls = daemon.calls();
    let [DaemonCall::Add { magnet, download_dir }] = calls.as_slice() else {
        panic!("expected one add call, got {calls:?}");
    };
    assert_eq!(magnet, "magnet:?xt=urn:btih:ABC");
    let stamp = download_dir.strip_prefix("/tmp/downloads/").expect("under base dir");
    assert_eq!(stamp.len(), 14);
    assert!(stamp.chars().all(|c| c.is_ascii_digit()));
}

#[tokio::test]
async fn test_handle_add_without_magnet_asks_to_check_link() {
    let daemon = FakeDaemon::empty();
    let replies = reply_to("/add http://example.com", &daemon).await;
    assert_eq!(replies[1], "Please check your magnet link and try again");
    assert!(daemon.calls().is_empty());
}

#[tokio::test]
async fn test_handle_page_url_adds_first_magnet() {
    let daemon = FakeDaemon::empty();
    let transport = RecordingTransport::new();
    let pages = StaticPages(Some(
        r#"<a href="magnet:?xt=urn:btih:ONE">1</a><a href="magnet:?xt=urn:btih:TWO">2</a>"#
            .to_string(),
    ));

    let replies = exchange(
        &text_from(OWNER, "https://tracker.example/t/1"),
        &daemon,
        &transport,
        &pages,
        None,
    )
    .await;

    assert_eq!(replies[1], "Torrent was successfully added with ID #42");
    assert!(matches!(
        daemon.calls().as_slice(),
        [DaemonCall::Add { magnet, .. }] if magnet == "magnet:?xt=urn:btih:ONE"
    ));
}

#[tokio::test]
async fn test_handle_page_without_magnet_or_fetch_failure() {
    for pages in [StaticPages(Some("<html/>".to_string())), StaticPages(None)] {
        let daemon = FakeDaemon::empty();
        let transport = RecordingTransport::new();
        let replies = exchange(
            &text_from(OWNER, "https://tracker.example/t/1"),
            &daemon,
            &transport,
            &pages,
            None,
        )
        .await;
        assert_eq!(
            replies[1],
            "Can't find a magnet link for your URL, please provide it directly"
        );
        assert_eq!(daemon.connects(), 0);
    }
}

#[tokio::test]
async fn test_handle_torrent_document_adds_hex_magnet() {
    let daemon = FakeDaemon::empty();
    let mut transport = RecordingTransport::new();
    transport.document = b"d4:infod4:name1:xee".to_vec();
    let pages = StaticPages(None);
    let message = IncomingMessage {
        text: None,
        document: Some(DocumentRef {
            file_id: "file-1".to_string(),
            file_name: Some("x.torrent".to_string()),
        }),
        ..text_from(OWNER, "")
    };

    let replies = exchange(&message, &daemon, &transport, &pages, None).await;

    assert_eq!(replies[1], "Torrent was successfully added with ID #42");
    let calls = daemon.calls();
    let [DaemonCall::Add { magnet, .. }] = calls.as_slice() else {
        panic!("expected one add call, got {calls:?}");
    };
    assert!(magnet.starts_with("magnet:?xt=urn:btih:"));
    assert_eq!(magnet.len(), "magnet:?xt=urn:btih:".len() + 40);
}

#[tokio::test]
async fn test_handle_invalid_torrent_document_reports_error() {
    let daemon = FakeDaemon::empty();
    let mut transport = RecordingTransport::new();
    transport.document = b"not bencode".to_vec();
    let pages = StaticPages(None);
    let message = IncomingMessage {
        text: None,
        document: Some(DocumentRef {
            file_id: "file-1".to_string(),
            file_name: None,
        }),
        ..text_from(OWNER, "")
    };

    let replies = exchange(&message, &daemon, &transport, &pages, None).await;

    assert!(replies[1].starts_with("Error: "));
    assert!(daemon.calls().is_empty());
}

#[tokio::test]
async fn test_handle_go_only_starts_existing_ids() {
    let daemon = FakeDaemon::with_ids(&[1, 2, 3]);
    let replies = reply_to("/go 2 9 x", &daemon).await;

    assert_eq!(replies[1], "Torrents with IDs 2 9 x were started.\n");
    assert_eq!(
        daemon.calls(),
        vec![DaemonCall::List, DaemonCall::Start(vec![2])]
    );
}

#[tokio::test]
async fn test_handle_delete_with_no_existing_ids_sends_nothing() {
    let daemon = FakeDaemon::with_ids(&[1]);
    let replies = reply_to("/delete 5 6", &daemon).await;

    assert_eq!(replies[1], "Torrents with IDs 5 6 were deleted.\n");
    assert_eq!(daemon.calls(), vec![DaemonCall::List]);
}

#[tokio::test]
async fn test_handle_stop_existing_ids() {
    let daemon = FakeDaemon::with_ids(&[4, 5]);
    let replies = reply_to("/stop 5 4", &daemon).await;

    assert_eq!(replies[1], "Torrents with IDs 5 4 were stopped.\n");
    assert_eq!(
        daemon.calls(),
        vec![DaemonCall::List, DaemonCall::Stop(vec![4, 5])]
    );
}

#[tokio::test]
async fn test_handle_wanted_unselects_other_files() {
    let daemon = FakeDaemon::with_ids(&[7]);
    let replies = reply_to("/wanted 7 1", &daemon).await;

    assert_eq!(replies[1], "Torrent 7 download only [1]");
    assert_eq!(
        daemon.calls(),
        vec![
            DaemonCall::Files(vec![7]),
            DaemonCall::SetFiles {
                id: 7,
                wanted: vec![1],
                unwanted: vec![0, 2],
            },
        ]
    );
}

#[tokio::test]
async fn test_handle_wanted_unknown_torrent_reports_error() {
    let daemon = FakeDaemon::with_ids(&[7]);
    let replies = reply_to("/wanted 8 1", &daemon).await;
    assert_eq!(replies[1], "Error: Torrent 8 not found");
}

#[tokio::test]
async fn test_handle_wanted_usage_error() {
    let daemon = FakeDaemon::with_ids(&[7]);
    let replies = reply_to("/wanted 7", &daemon).await;
    assert_eq!(
        replies[1],
        "Usage: /wanted <torrent id> <file id> [file id...]"
    );
    assert!(daemon.calls().is_empty());
}

#[tokio::test]
async fn test_handle_daemon_failure_becomes_reply() {
    let mut daemon = FakeDaemon::with_ids(&[1]);
    daemon.fail = true;
    let replies = reply_to("/list", &daemon).await;
    assert_eq!(replies[1], "Error: connection refused");
}

#[tokio::test]
async fn test_handle_destroy_triggers_destroy_run() {
    let daemon = FakeDaemon::empty();
    let transport = RecordingTransport::new();
    let pages = StaticPages(None);
    let plane = ScriptedControlPlane::always(RunStatus::Applied, false);

    let replies = exchange(
        &text_from(OWNER, "/destroy"),
        &daemon,
        &transport,
        &pages,
        Some(&plane),
    )
    .await;

    assert_eq!(replies[1], "Destroy request was sent");
    assert_eq!(
        plane.triggers(),
        vec![(true, "Destroy from bot with command".to_string())]
    );
    assert_eq!(daemon.connects(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_handle_list_after_destroy_acquires_host_again() {
    let daemon = FakeDaemon::with_ids(&[1]);
    let transport = RecordingTransport::new();
    let pages = StaticPages(None);
    // Applied, then the destroy queued by /destroy has applied, then the
    // create run queued by acquisition has applied.
    let plane = ScriptedControlPlane::new(
        vec![
            run(RunStatus::Applied, false),
            run(RunStatus::Applied, true),
            run(RunStatus::Applied, false),
        ],
        "198.51.100.4",
    );
    let probe = ScriptedProbe::reachable();
    let cp_config = plane_config();
    let policy = AcquisitionPolicy::default();
    let opened = Mutex::new(Vec::new());
    let daemons = DaemonConnector::new(
        HostSource::Acquired(HostAcquisition::new(
            &plane, &probe, &cp_config, &policy, 9091,
        )),
        |host: &str| {
            opened.lock().unwrap().push(host.to_string());
            Ok::<_, anyhow::Error>(daemon.clone())
        },
    );
    let chat = chat_config();
    let service = ChatService {
        transport: &transport,
        daemons: &daemons,
        pages: &pages,
        control_plane: Some((&plane, &cp_config)),
        chat: &chat,
        download_dir: "/tmp/downloads",
    };

    for text in ["/list", "/destroy", "/list"] {
        service.handle(&text_from(OWNER, text)).await.expect("replies sent");
    }

    let replies = transport.replies_to(OWNER);
    assert_eq!(replies[1], "Active torrents:\n#1 torrent-1 downloading 50.0\n");
    assert_eq!(replies[3], "Destroy request was sent");
    assert_eq!(replies[5], replies[1]);
    assert_eq!(
        plane.triggers(),
        vec![
            (true, "Destroy from bot with command".to_string()),
            (false, "Create from bot".to_string()),
        ]
    );
    assert_eq!(plane.count(&PlaneCall::LatestRun), 3);
    assert_eq!(
        *opened.lock().unwrap(),
        vec!["198.51.100.4".to_string(), "198.51.100.4".to_string()]
    );
}

#[tokio::test]
async fn test_handle_static_host_connects_per_command() {
    let daemon = FakeDaemon::with_ids(&[1]);
    let transport = RecordingTransport::new();
    let pages = StaticPages(None);
    let opened = Mutex::new(Vec::new());
    let daemons: DaemonConnector<'_, ScriptedControlPlane, ScriptedProbe, _> =
        DaemonConnector::new(HostSource::Static("10.0.0.5"), |host: &str| {
            opened.lock().unwrap().push(host.to_string());
            Ok::<_, anyhow::Error>(daemon.clone())
        });
    let chat = chat_config();
    let service: ChatService<'_, _, _, _, ScriptedControlPlane> = ChatService {
        transport: &transport,
        daemons: &daemons,
        pages: &pages,
        control_plane: None,
        chat: &chat,
        download_dir: "/tmp/downloads",
    };

    for text in ["/list", "/stop 1"] {
        service.handle(&text_from(OWNER, text)).await.expect("replies sent");
    }

    assert_eq!(
        *opened.lock().unwrap(),
        vec!["10.0.0.5".to_string(), "10.0.0.5".to_string()]
    );
    assert_eq!(
        daemon.calls(),
        vec![DaemonCall::List, DaemonCall::List, DaemonCall::Stop(vec![1])]
    );
}

#[tokio::test]
async fn test_handle_destroy_without_control_plane_reports_error() {
    let replies = reply_to("/destroy", &FakeDaemon::empty()).await;
    assert!(replies[1].starts_with("Error: No control plane configured"));
}

#[tokio::test(start_paused = true)]
async fn test_run_advances_offset_and_stops_on_shutdown() {
    let daemon = FakeDaemon::with_ids(&[1]);
    let transport = RecordingTransport::with_batches(vec![
        UpdateBatch {
            next_offset: 11,
            messages: vec![IncomingMessage {
                update_id: 10,
                ..text_from(OWNER, "/list")
            }],
        },
        UpdateBatch {
            next_offset: 13,
            messages: Vec::new(),
        },
    ]);
    let pages = StaticPages(None);
    let chat = chat_config();
    let service: ChatService<'_, _, _, _, ScriptedControlPlane> = ChatService {
        transport: &transport,
        daemons: &daemon,
        pages: &pages,
        control_plane: None,
        chat: &chat,
        download_dir: "/tmp/downloads",
    };

    service
        .run(tokio::time::sleep(Duration::from_secs(45)))
        .await
        .expect("clean shutdown");

    let offsets = transport.polled_offsets.lock().unwrap().clone();
    assert_eq!(&offsets[..3], &[0, 11, 13]);
    assert_eq!(transport.replies_to(OWNER).len(), 2);
}
