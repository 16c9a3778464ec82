//! Input file to archive, through the public API only.

use std::io::{Cursor, Read};

use guidegen_assets::AssetIngestor;
use guidegen_core::{GuideInput, SilentProgress, generate_guide};
use guidegen_shared::{AppConfig, GuideError};
use guidegen_taxonomy::fallback_map;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zip::ZipArchive;

const INPUT: &str = r#"
[metadata]
id = "cortex-quickstart"
author = "Jane Doe"
products = ["Snowflake Cortex"]
featured = true

[sections]
title = "Cortex Quickstart"
overview = "Intro <img alt=\"Arch\" src=\"assets/arch.png\">"
learn = ["Prompting"]

[[sections.steps]]
title = ""
content = ""

[[sections.steps]]
title = "Setup"
content = "Run setup.sql"

[assets]
images = ["arch.png"]
files = ["setup.sql", "README.md"]
urls = ["{server}/static/Logo_Dark.svg", "{server}/missing.png"]
"#;

fn read_entry(archive: &mut ZipArchive<Cursor<Vec<u8>>>, name: &str) -> String {
    let mut entry = archive.by_name(name).unwrap();
    let mut contents = String::new();
    entry.read_to_string(&mut contents).unwrap();
    contents
}

#[tokio::test]
async fn input_file_to_archive() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/static/Logo_Dark.svg"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<svg/>"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/missing.png"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let input_dir = tempfile::tempdir().unwrap();
    std::fs::write(input_dir.path().join("arch.png"), b"\x89PNG").unwrap();
    std::fs::write(input_dir.path().join("setup.sql"), b"create table t (a int);").unwrap();
    std::fs::write(input_dir.path().join("README.md"), b"# not an asset").unwrap();
    let input_path = input_dir.path().join("guide.toml");
    std::fs::write(&input_path, INPUT.replace("{server}", &server.uri())).unwrap();

    let config = AppConfig::default();
    let request = GuideInput::load(&input_path)
        .unwrap()
        .into_request(input_dir.path(), &fallback_map(), &config.defaults, &config.assets)
        .unwrap();
    let ingestor = AssetIngestor::new(&config.assets)
        .unwrap()
        .allow_localhost()
        .unwrap();

    let work = tempfile::tempdir().unwrap();
    let output = generate_guide(&request, &ingestor, work.path(), &SilentProgress)
        .await
        .unwrap();

    assert!(output.issues.is_empty(), "{:?}", output.issues);
    let saved: Vec<_> = output.assets.iter().map(|a| a.relative_path.as_str()).collect();
    assert_eq!(
        saved,
        vec!["assets/arch.png", "assets/setup.sql", "assets/logo-dark.svg"]
    );

    let mut archive = ZipArchive::new(Cursor::new(output.archive)).unwrap();
    assert_eq!(archive.len(), 4);

    let doc = read_entry(&mut archive, "site/sfguides/src/cortex-quickstart/cortex-quickstart.md");
    assert!(doc.starts_with("author: Jane Doe\nid: cortex-quickstart\nlanguage: en\n"));
    assert!(doc.contains(
        "categories: snowflake-site:taxonomy/products/snowflake-cortex, \
         snowflake-site:taxonomy/solution-center/certification/quickstart, \
         snowflake-site:taxonomy/technical/featured\n"
    ));
    assert!(doc.contains("Intro ![Arch](assets/arch.png)"));
    assert!(doc.contains("## Step 1: Setup\n"));
    assert!(!doc.contains("## Step 2"));

    assert_eq!(
        read_entry(&mut archive, "site/sfguides/src/cortex-quickstart/assets/logo-dark.svg"),
        "<svg/>"
    );
}

#[tokio::test]
async fn invalid_input_fails_before_writing() {
    let input = GuideInput::from_toml_str("[metadata]\nid = \"-bad-\"\n").unwrap();
    let dir = tempfile::tempdir().unwrap();

    let config = AppConfig::default();
    let err = input
        .into_request(dir.path(), &fallback_map(), &config.defaults, &config.assets)
        .unwrap_err();

    assert!(matches!(err, GuideError::InvalidGuideId(_)));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}
