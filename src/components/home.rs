use crate::services;
use dioxus::prelude::*;
use video_gallery::{
    share_media, CommitOutcome, GalleryStore, MediaRecord, SelectOutcome, ShareRequest,
    UploadState,
};

/// One tile in the video grid
#[component]
fn VideoTile(record: MediaRecord, on_select: EventHandler<MediaRecord>) -> Element {
    let uri = record.uri.clone();
    rsx! {
        div {
            style: "position: relative; background: #fff; border-radius: 12px; height: 150px; overflow: hidden; cursor: pointer; box-shadow: 0 2px 4px rgba(0,0,0,0.1);",
            onclick: move |_| on_select.call(record.clone()),
            video {
                style: "width: 100%; height: 100%; object-fit: cover; background: #f5f5f5;",
                src: "{uri}",
                preload: "metadata",
                muted: true,
            }
            div { style: "position: absolute; top: 50%; left: 50%; transform: translate(-50%, -50%); font-size: 40px; color: #fff; opacity: 0.9;",
                "▶"
            }
        }
    }
}

#[component]
pub fn HomeScreen() -> Element {
    let mut videos = use_signal(Vec::<MediaRecord>::new);
    let mut store_error = use_signal(|| None::<String>);
    let mut selected_video = use_signal(|| None::<MediaRecord>);
    let mut show_upload_modal = use_signal(|| false);
    let mut show_delete_modal = use_signal(|| false);
    let mut show_exit_modal = use_signal(|| false);
    let mut upload_error = use_signal(|| None::<String>);
    let mut staged_uri = use_signal(|| None::<String>);
    let mut is_checking = use_signal(|| false);
    let mut checking_progress = use_signal(|| 0u8);
    let mut is_uploading = use_signal(|| false);
    let mut upload_progress = use_signal(|| 0u8);

    // Live gallery subscription: the grid is always a projection of the
    // store's last snapshot, never locally patched.
    use_effect(move || match services::media_store() {
        Ok(store) => {
            let mut gallery = GalleryStore::from_store(&store);
            spawn(async move {
                loop {
                    videos.set(gallery.latest());
                    if !gallery.changed().await {
                        break;
                    }
                }
            });
        }
        Err(e) => {
            log::error!("Failed to open media store: {}", e);
            store_error.set(Some(e.user_message()));
        }
    });

    let select_video = move |_| {
        upload_error.set(None);
        upload_progress.set(0);
        checking_progress.set(0);
        staged_uri.set(None);
        spawn(async move {
            let coordinator = match services::upload_coordinator() {
                Ok(c) => c,
                Err(e) => {
                    upload_error.set(Some(e.user_message()));
                    return;
                }
            };

            // the indicator tracks the coordinator's actual state, so it
            // stays hidden while the picker is still open
            let mut state_rx = coordinator.states();
            let state_forward = spawn(async move {
                loop {
                    is_checking.set(*state_rx.borrow_and_update() == UploadState::Checking);
                    if state_rx.changed().await.is_err() {
                        break;
                    }
                }
            });
            let mut progress_rx = coordinator.checking_progress();
            let forward = spawn(async move {
                loop {
                    checking_progress.set(*progress_rx.borrow_and_update());
                    if progress_rx.changed().await.is_err() {
                        break;
                    }
                }
            });

            let outcome = coordinator.select().await;
            forward.cancel();
            state_forward.cancel();
            is_checking.set(false);

            match outcome {
                SelectOutcome::Staged(staged) => staged_uri.set(Some(staged.uri)),
                SelectOutcome::Cancelled | SelectOutcome::Busy => {}
                SelectOutcome::Rejected { reason } | SelectOutcome::PickerFailed { reason } => {
                    upload_error.set(Some(reason));
                }
            }
        });
    };

    let upload_video = move |_| {
        spawn(async move {
            let coordinator = match services::upload_coordinator() {
                Ok(c) => c,
                Err(e) => {
                    upload_error.set(Some(e.user_message()));
                    return;
                }
            };

            upload_error.set(None);
            upload_progress.set(0);
            is_uploading.set(true);
            let mut progress_rx = coordinator.upload_progress();
            let forward = spawn(async move {
                loop {
                    upload_progress.set(*progress_rx.borrow_and_update());
                    if progress_rx.changed().await.is_err() {
                        break;
                    }
                }
            });

            let outcome = coordinator.commit().await;
            forward.cancel();
            is_uploading.set(false);

            match outcome {
                CommitOutcome::Committed(_) => {
                    // the new record arrives through the snapshot
                    // subscription, not from the commit result
                    staged_uri.set(None);
                    upload_progress.set(0);
                    show_upload_modal.set(false);
                }
                CommitOutcome::NotStaged => {}
                CommitOutcome::Rejected { reason } | CommitOutcome::Failed { reason } => {
                    staged_uri.set(None);
                    upload_error.set(Some(reason));
                }
            }
        });
    };

    let close_upload_modal = move |_| {
        // dismissal is blocked while a write may be in flight
        if !is_uploading() {
            if let Ok(coordinator) = services::upload_coordinator() {
                coordinator.cancel();
            }
            show_upload_modal.set(false);
            upload_error.set(None);
            staged_uri.set(None);
        }
    };

    let share_video = move |_| {
        spawn(async move {
            if let Some(video) = selected_video() {
                let request = ShareRequest {
                    mime_type: "video/*".to_string(),
                    url: video.uri.clone(),
                };
                if let Err(e) = share_media(&request).await {
                    log::error!("Error sharing video: {}", e);
                }
            }
        });
    };

    let handle_delete = move |_| {
        if selected_video.read().is_some() {
            show_delete_modal.set(true);
        }
    };

    let confirm_delete = move |_| {
        spawn(async move {
            if let Some(video) = selected_video() {
                services::delete_video(&video.id).await;
            }
            // modal and selection are cleared regardless of the outcome
            selected_video.set(None);
            show_delete_modal.set(false);
        });
    };

    rsx! {
        div { style: "flex: 1; display: flex; flex-direction: column; background: #f5f5f5; position: relative; overflow: hidden;",

            // Header with exit confirmation (stands in for back navigation)
            div { style: "display: flex; justify-content: space-between; align-items: center; padding: 12px 16px; background: #fff; border-bottom: 1px solid #e0e0e0;",
                h1 { style: "margin: 0; font-size: 20px; font-weight: 600; color: #333;", "Clipshelf" }
                button {
                    style: "background: none; border: none; font-size: 18px; cursor: pointer; color: #888;",
                    onclick: move |_| show_exit_modal.set(true),
                    "⏻"
                }
            }

            if let Some(message) = store_error() {
                div { style: "background: rgba(255, 59, 48, 0.1); padding: 12px; margin: 12px; border-radius: 8px;",
                    p { style: "color: #FF3B30; margin: 0; font-size: 14px;", "{message}" }
                }
            }

            // Video grid
            div { style: "flex: 1; overflow-y: auto; padding: 6px;",
                if videos().is_empty() {
                    div { style: "display: flex; flex-direction: column; align-items: center; justify-content: center; padding: 60px 20px;",
                        p { style: "font-size: 16px; color: #888; text-align: center;",
                            "No videos yet. Tap + to upload one."
                        }
                    }
                } else {
                    div { style: "display: grid; grid-template-columns: 1fr 1fr; gap: 10px; padding: 4px; padding-bottom: 90px;",
                        for video in videos() {
                            VideoTile {
                                key: "{video.id}",
                                record: video,
                                on_select: move |record| selected_video.set(Some(record)),
                            }
                        }
                    }
                }
            }

            // Floating add button
            button {
                style: "position: absolute; bottom: 20px; right: 20px; width: 60px; height: 60px; border-radius: 30px; background: #0066cc; color: #fff; font-size: 32px; border: none; cursor: pointer; box-shadow: 0 4px 8px rgba(0,0,0,0.3);",
                onclick: move |_| show_upload_modal.set(true),
                "+"
            }

            // Upload modal
            if show_upload_modal() {
                div { style: "position: fixed; inset: 0; background: rgba(0,0,0,0.5); display: flex; justify-content: center; align-items: center; padding: 20px; z-index: 10;",
                    div { style: "background: #fff; width: 90%; max-width: 400px; border-radius: 15px; padding: 20px;",
                        div { style: "display: flex; justify-content: space-between; align-items: center; margin-bottom: 20px; padding-bottom: 10px; border-bottom: 1px solid #e0e0e0;",
                            h2 { style: "margin: 0; font-size: 20px; font-weight: 600; color: #333;", "Upload Video" }
                            if !is_uploading() {
                                button {
                                    style: "background: none; border: none; font-size: 24px; color: #888; cursor: pointer;",
                                    onclick: close_upload_modal,
                                    "×"
                                }
                            }
                        }

                        if let Some(message) = upload_error() {
                            div { style: "background: rgba(255, 59, 48, 0.1); padding: 12px; border-radius: 8px; margin-bottom: 12px;",
                                p { style: "color: #FF3B30; margin: 0; font-size: 14px;", "{message}" }
                            }
                        }

                        if !is_uploading() {
                            button {
                                style: "display: flex; align-items: center; justify-content: center; width: 100%; padding: 15px; border-radius: 10px; border: 1px dashed #0066cc; background: #f5f5f5; color: #0066cc; font-size: 16px; cursor: pointer;",
                                onclick: select_video,
                                if staged_uri.read().is_some() {
                                    "Select Different Video"
                                } else {
                                    "Select Video"
                                }
                            }
                        }

                        if is_checking() {
                            div { style: "margin-top: 15px; text-align: center; padding: 10px;",
                                p { style: "font-size: 14px; color: #888; margin: 0 0 8px 0;",
                                    "Checking file size... {checking_progress}%"
                                }
                                div { style: "width: 100%; height: 4px; background: #e0e0e0; border-radius: 2px; overflow: hidden;",
                                    div { style: "width: {checking_progress}%; height: 100%; background: #0066cc;" }
                                }
                            }
                        }

                        if let Some(uri) = staged_uri() {
                            div { style: "margin-top: 20px;",
                                if !is_uploading() {
                                    div {
                                        p { style: "color: #4CAF50; font-size: 14px; font-weight: 500; margin: 0 0 10px 0;",
                                            "✓ Video Selected"
                                        }
                                        p { style: "font-size: 12px; color: #888; background: #f5f5f5; padding: 8px; border-radius: 6px; margin: 0 0 15px 0; overflow: hidden; text-overflow: ellipsis; white-space: nowrap;",
                                            "{uri}"
                                        }
                                        button {
                                            style: "width: 100%; padding: 15px; border-radius: 10px; border: none; background: #0066cc; color: #fff; font-size: 16px; font-weight: 600; cursor: pointer;",
                                            onclick: upload_video,
                                            "Upload Video"
                                        }
                                    }
                                } else {
                                    div { style: "text-align: center; padding: 20px;",
                                        p { style: "font-size: 16px; color: #333; margin: 0 0 12px 0;",
                                            "Uploading... {upload_progress}%"
                                        }
                                        div { style: "width: 100%; height: 4px; background: #e0e0e0; border-radius: 2px; overflow: hidden;",
                                            div { style: "width: {upload_progress}%; height: 100%; background: #0066cc;" }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }

            // Video player modal
            if let Some(video) = selected_video() {
                div { style: "position: fixed; inset: 0; background: rgba(0,0,0,0.9); display: flex; flex-direction: column; z-index: 20;",
                    div { style: "display: flex; justify-content: space-between; align-items: center; padding: 12px 16px; background: rgba(0,0,0,0.8); border-bottom: 1px solid rgba(255,255,255,0.1);",
                        button {
                            style: "width: 40px; height: 40px; border-radius: 20px; border: none; background: rgba(255,255,255,0.1); color: #fff; font-size: 18px; cursor: pointer;",
                            onclick: move |_| selected_video.set(None),
                            "×"
                        }
                        h2 { style: "margin: 0; font-size: 18px; font-weight: 600; color: #fff;", "Video Player" }
                        div { style: "display: flex; gap: 8px;",
                            button {
                                style: "width: 40px; height: 40px; border-radius: 20px; border: none; background: rgba(255,255,255,0.1); color: #fff; font-size: 16px; cursor: pointer;",
                                onclick: share_video,
                                "↗"
                            }
                            button {
                                style: "width: 40px; height: 40px; border-radius: 20px; border: none; background: rgba(255,59,48,0.2); color: #FF3B30; font-size: 16px; cursor: pointer;",
                                onclick: handle_delete,
                                "🗑"
                            }
                        }
                    }
                    div { style: "flex: 1; display: flex; justify-content: center; align-items: center; background: #000;",
                        video {
                            style: "width: 100%; max-height: 80%;",
                            src: "{video.uri}",
                            controls: true,
                            autoplay: true,
                        }
                    }
                }
            }

            // Delete confirmation modal
            if show_delete_modal() {
                div { style: "position: fixed; inset: 0; background: rgba(0,0,0,0.5); display: flex; justify-content: center; align-items: center; padding: 20px; z-index: 30;",
                    div { style: "background: #fff; border-radius: 20px; padding: 24px; width: 90%; max-width: 340px; text-align: center;",
                        div { style: "font-size: 40px; margin-bottom: 16px;", "🗑" }
                        h2 { style: "margin: 0 0 8px 0; font-size: 20px; font-weight: 600; color: #333;",
                            "Delete Video"
                        }
                        p { style: "font-size: 16px; color: #888; margin: 0 0 24px 0; line-height: 22px;",
                            "Are you sure you want to delete this video? This action cannot be undone."
                        }
                        div { style: "display: flex; gap: 12px;",
                            button {
                                style: "flex: 1; padding: 14px; border-radius: 10px; border: 1px solid #e0e0e0; background: #f5f5f5; color: #333; font-size: 16px; font-weight: 600; cursor: pointer;",
                                onclick: move |_| show_delete_modal.set(false),
                                "Cancel"
                            }
                            button {
                                style: "flex: 1; padding: 14px; border-radius: 10px; border: none; background: #FF3B30; color: #fff; font-size: 16px; font-weight: 600; cursor: pointer;",
                                onclick: confirm_delete,
                                "Delete"
                            }
                        }
                    }
                }
            }

            // Exit confirmation
            if show_exit_modal() {
                div { style: "position: fixed; inset: 0; background: rgba(0,0,0,0.5); display: flex; justify-content: center; align-items: center; padding: 20px; z-index: 40;",
                    div { style: "background: #fff; border-radius: 20px; padding: 24px; width: 90%; max-width: 340px; text-align: center;",
                        h2 { style: "margin: 0 0 8px 0; font-size: 20px; font-weight: 600; color: #333;",
                            "Exit App"
                        }
                        p { style: "font-size: 16px; color: #888; margin: 0 0 24px 0;",
                            "Do you want to exit the app?"
                        }
                        div { style: "display: flex; gap: 12px;",
                            button {
                                style: "flex: 1; padding: 14px; border-radius: 10px; border: 1px solid #e0e0e0; background: #f5f5f5; color: #333; font-size: 16px; font-weight: 600; cursor: pointer;",
                                onclick: move |_| show_exit_modal.set(false),
                                "Cancel"
                            }
                            button {
                                style: "flex: 1; padding: 14px; border-radius: 10px; border: none; background: #0066cc; color: #fff; font-size: 16px; font-weight: 600; cursor: pointer;",
                                onclick: move |_| -> () { std::process::exit(0) },
                                "Exit"
                            }
                        }
                    }
                }
            }
        }
    }
}
