use ibook_notes::{ExportOptions, Exporter};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::path::Path;
use tempfile::TempDir;

async fn create_db(path: &Path, script: &str) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .unwrap();
    sqlx::query(script).execute(&pool).await.unwrap();
    pool.close().await;
}

const ANNOTATION_TABLE: &str = r#"
    CREATE TABLE ZAEANNOTATION (
        Z_PK INTEGER PRIMARY KEY,
        ZANNOTATIONDELETED INTEGER,
        ZANNOTATIONCREATIONDATE TIMESTAMP,
        ZANNOTATIONMODIFICATIONDATE TIMESTAMP,
        ZANNOTATIONASSETID VARCHAR,
        ZANNOTATIONLOCATION VARCHAR,
        ZANNOTATIONNOTE VARCHAR,
        ZANNOTATIONREPRESENTATIVETEXT VARCHAR,
        ZANNOTATIONSELECTEDTEXT VARCHAR,
        ZFUTUREPROOFING5 VARCHAR
    );
"#;

fn options(root: &Path) -> ExportOptions {
    ExportOptions {
        books_dir: root.join("BKLibrary").to_string_lossy().into_owned(),
        annotations_dir: root.join("AEAnnotation").to_string_lossy().into_owned(),
        out_dir: root.join("ibook_notes"),
    }
}

#[tokio::test]
async fn exports_books_in_reading_order() {
    let root = TempDir::new().unwrap();
    create_db(
        &root.path().join("BKLibrary/BKLibrary-1-091020131601.sqlite"),
        r#"
        CREATE TABLE ZBKLIBRARYASSET (ZASSETID VARCHAR, ZTITLE VARCHAR, ZAUTHOR VARCHAR);
        INSERT INTO ZBKLIBRARYASSET VALUES ('B1', 'Demo', 'A');
        "#,
    )
    .await;
    create_db(
        &root.path().join("AEAnnotation/AEAnnotation_v10312011_1727_local.sqlite"),
        &format!(
            "{ANNOTATION_TABLE}
            INSERT INTO ZAEANNOTATION VALUES
                (1, 0, 1.0, 1.0, 'B1', 'epubcfi(/6/12[c2]!/4/2,/1:0,/1:9)', NULL, 'p', 'Second', 'Two'),
                (2, 0, 2.0, 2.0, 'B1', 'epubcfi(/6/10[c1]!/4/8,/1:0,/1:5)', NULL, 'p', 'First', 'One'),
                (3, 0, 3.0, 3.0, 'B1', 'epubcfi(/6/10[c1]!/4/2,/1:0,/1:3)', NULL, 'p', 'One', 'One'),
                (4, 0, 4.0, 4.0, 'C7A1F0', '4/2', 'loose note', 'p', 'Unknown book', NULL);
            "
        ),
    )
    .await;

    let summary = Exporter::new(options(root.path())).run().await.unwrap();
    assert_eq!(summary.files.len(), 2);

    let demo = std::fs::read_to_string(root.path().join("ibook_notes/Demo.md")).unwrap();
    let body = &demo[demo.find("\n---").unwrap()..];
    assert_eq!(
        body,
        "\n---\n### Chapter: One\nFirst\n\n\n---\n### Chapter: Two\nSecond\n\n"
    );

    let unknown = std::fs::read_to_string(root.path().join("ibook_notes/C7A1F0.md")).unwrap();
    let mut lines = unknown.lines();
    assert_eq!(lines.next(), Some("- assetID: C7A1F0"));
    assert!(lines.next().unwrap().starts_with("- Export date: "));
    assert_eq!(lines.collect::<Vec<_>>(), vec!["Unknown book", "> Note: loose note", ""]);
}

#[tokio::test]
async fn rerun_overwrites_previous_output() {
    let root = TempDir::new().unwrap();
    let db = root.path().join("AEAnnotation/AEAnnotation.sqlite");
    create_db(
        &db,
        &format!(
            "{ANNOTATION_TABLE}
            INSERT INTO ZAEANNOTATION VALUES (1, 0, 1.0, 1.0, 'B1', '1', NULL, NULL, 'kept', NULL);
            "
        ),
    )
    .await;

    let out = root.path().join("ibook_notes/B1.md");
    std::fs::create_dir_all(out.parent().unwrap()).unwrap();
    std::fs::write(&out, "stale content").unwrap();

    Exporter::new(options(root.path())).run().await.unwrap();

    let text = std::fs::read_to_string(&out).unwrap();
    assert!(!text.contains("stale"));
    assert!(text.ends_with("kept\n\n"));
}
