use super::*;

use std::path::{Path, PathBuf};

use render_core::{DialogPanels, FsTemplateFetcher};

fn site_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("site")
}

fn fetcher(root: impl AsRef<Path>) -> Arc<dyn TemplateFetcher> {
    Arc::new(FsTemplateFetcher::new(root.as_ref()))
}

#[test]
fn page_paths_are_normalized() {
    assert_eq!(normalize_page_path(""), "/");
    assert_eq!(normalize_page_path("software/system"), "/software/system/");
    assert_eq!(normalize_page_path("/software/system/"), "/software/system/");
    assert_eq!(normalize_page_path("/software/index.html"), "/software/index.html");
    assert_eq!(normalize_page_path("/software/INDEX.HTM"), "/software/INDEX.HTM");
    assert_eq!(normalize_page_path("/roms/v1.2"), "/roms/v1.2/");
    assert_eq!(normalize_page_path("/roms/MIUI 14.0.5"), "/roms/MIUI 14.0.5/");
    assert_eq!(page_directory("/software/index.html"), "/software/");
    assert_eq!(page_directory("/software/system/"), "/software/system/");
}

#[tokio::test]
async fn listing_page_renders_every_region() {
    let settings = Settings::default();
    let page = render_page(
        fetcher(site_root()),
        &settings,
        "/software/system/android/xiaomi/polaris/",
    )
    .await
    .expect("render");

    assert_eq!(
        page.title,
        "/software/system/android/xiaomi/polaris/ - 一起分享吧！文件！"
    );
    assert_eq!(page.decision, RedirectDecision::NoRedirect);
    assert_eq!(page.redirect, None);

    assert!(page
        .html
        .contains(r#"<h1 id="header-title"><a href="https://github.com/LetsShareAll/Share_File""#));
    assert!(page.html.contains(
        r#"/<a href="http://localhost/software/system/android/xiaomi/polaris">polaris</a></h3>"#
    ));
    assert_eq!(page.html.matches(r#"<tr class="row">"#).count(), 6);
    assert!(page.html.contains(r#"<td class="name"><a href="./Evolution X/">Evolution X</a></td>"#));
    assert!(!page.html.contains("${row."));
}

#[tokio::test]
async fn empty_listing_shows_placeholder_row() {
    let settings = Settings::default();
    let page = render_page(fetcher(site_root()), &settings, "/")
        .await
        .expect("render");

    assert_eq!(page.title, "/ - 一起分享吧！文件！");
    assert!(page.html.contains(
        r#"<tbody id="file-list-body"><tr class="empty-row"><td colspan="6">这里空空如也(ˉ▽ˉ；)...</td></tr></tbody>"#
    ));
    assert!(page.html.contains(r#"<h3 id="path"><a href="http://localhost">root</a></h3>"#));
}

#[tokio::test]
async fn redirect_with_code_shows_dialog() {
    let settings = Settings::default();
    let page = render_page(fetcher(site_root()), &settings, "/software/tools/aliyun-drive")
        .await
        .expect("render");

    assert_eq!(
        page.decision,
        RedirectDecision::ConfirmRedirect {
            url: "https://www.aliyundrive.com/s/example".into(),
            panels: DialogPanels {
                prompt: true,
                code: true,
            },
        }
    );
    assert_eq!(page.redirect, None);
    assert!(page.html.contains(r#"<tr class="info"><div class="overlay" style="display: flex">"#));
    assert!(page.html.contains(r#"<div class="dialog-code" style="display: block">"#));
    assert!(page.html.contains(r#"<div class="dialog-url" style="display: block">"#));
    assert!(page.html.contains(r#"<input type="text" value="a1b2" readonly>"#));
    assert!(page.html.contains("<b>复制提取码</b>"));
}

#[tokio::test]
async fn redirect_without_prompt_navigates_immediately() {
    let settings = Settings::default();
    let page = render_page(fetcher(site_root()), &settings, "/software/tools/mirror/")
        .await
        .expect("render");

    let url = "https://www.123pan.com/s/example";
    assert_eq!(page.decision, RedirectDecision::SilentRedirect { url: url.into() });
    assert_eq!(page.redirect, Some(RefreshDirective::immediate(url)));
    assert!(page
        .html
        .contains(r#"<meta http-equiv="Refresh" content="0; URL=https://www.123pan.com/s/example">"#));
    assert!(!page.html.contains("overlay"));
}

#[tokio::test]
async fn missing_page_data_fails_the_page() {
    let settings = Settings::default();
    let error = render_page(fetcher(site_root()), &settings, "/software/")
        .await
        .unwrap_err();

    assert!(format!("{error:#}").contains("/software/file-info.toml"));
}

#[tokio::test]
async fn missing_shell_falls_back_to_builtin() {
    let settings = Settings {
        shell_path: "/missing-shell.html".into(),
        ..Settings::default()
    };
    let page = render_page(fetcher(site_root()), &settings, "/")
        .await
        .expect("render");

    assert!(page.html.starts_with(r#"<!DOCTYPE html><html lang="zh-CN">"#));
    assert!(page.html.contains(r#"<main id="file-list"><table class="file-list">"#));
}

#[tokio::test]
async fn failing_region_leaves_siblings_rendered() {
    let dir = tempfile::tempdir().expect("tempdir");
    let templates = dir.path().join("assets/templates");
    std::fs::create_dir_all(&templates).expect("templates dir");
    std::fs::write(dir.path().join("file-info.toml"), "files = []\n").expect("page data");
    std::fs::write(templates.join("header.html"), r#"<h1 id="header-title"></h1>"#)
        .expect("header");

    let settings = Settings {
        header_title: "Share".into(),
        ..Settings::default()
    };
    let page = render_page(fetcher(dir.path()), &settings, "/")
        .await
        .expect("render");

    assert!(page.html.contains(r#"<header id="header"><h1 id="header-title">Share</h1></header>"#));
    assert!(page.html.contains(r#"<nav id="nav"></nav>"#));
    assert!(page.html.contains(r#"<main id="file-list"></main>"#));
}

#[tokio::test]
async fn dotted_folder_reads_its_own_page_data() {
    let dir = tempfile::tempdir().expect("tempdir");
    let folder = dir.path().join("roms/v1.2");
    std::fs::create_dir_all(&folder).expect("folder");
    std::fs::write(
        folder.join("file-info.toml"),
        "[redirect]\nredirectURL = \"https://www.123pan.com/s/v12\"\n",
    )
    .expect("page data");

    let fetcher = FsTemplateFetcher::new(dir.path());
    let decision = classify_page(&fetcher, &Settings::default(), "/roms/v1.2")
        .await
        .expect("classify");

    assert_eq!(
        decision,
        RedirectDecision::SilentRedirect {
            url: "https://www.123pan.com/s/v12".into()
        }
    );
}

#[tokio::test]
async fn classify_page_reads_only_page_data() {
    let settings = Settings::default();
    let fetcher = FsTemplateFetcher::new(site_root());

    let decision = classify_page(&fetcher, &settings, "software/tools/aliyun-drive")
        .await
        .expect("classify");
    assert!(matches!(decision, RedirectDecision::ConfirmRedirect { .. }));

    let decision = classify_page(&fetcher, &settings, "/software/system/android/xiaomi/polaris")
        .await
        .expect("classify");
    assert_eq!(decision, RedirectDecision::NoRedirect);
}
