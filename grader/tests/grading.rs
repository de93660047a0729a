//! End-to-end grading of zipped submissions in a batch directory.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use site_grader::{Grader, Rubric, Scope};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const STYLE: &str = "body {\n  margin: 0 auto;\n  background-color: #fdf6e3;\n  font-family: Georgia, serif;\n}\n\
                     h1 {\n  font-family: Arial, sans-serif;\n}\n";

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n\
         <link rel=\"stylesheet\" href=\"css/style.css\">\n</head>\n<body>\n\
         <nav><a href=\"index.html\">Home</a> <a href=\"ABOUT.HTML\">About</a> \
         <a href=\"pages/gallery.html\">Gallery</a> <a href=\"contact.html\">Contact</a> \
         <a href=\"https://www.example.edu/\">School</a></nav>\n{}\n</body>\n</html>\n",
        title, body
    )
}

fn complete_site() -> Vec<(String, String)> {
    vec![
        (
            "site/index.html".into(),
            page(
                "Home",
                "<h1>Welcome</h1>\n<p>Hello.</p>\n<ul><li>one</li></ul>\n\
                 <img src=\"img/cat.jpg\" alt=\"A cat\">\n\
                 <a href=\"https://en.wikipedia.org/wiki/Cat\">Cats</a>",
            ),
        ),
        ("site/about.html".into(), page("About", "<h2>About me</h2>")),
        ("site/pages/gallery.html".into(), page("Gallery", "<div>pictures</div>")),
        ("site/contact.html".into(), page("Contact", "<div>mail me</div>")),
        ("site/css/style.css".into(), STYLE.into()),
        ("site/img/cat.jpg".into(), "not really a jpeg".into()),
        ("__MACOSX/site/._index.html".into(), "\u{0}resource fork".into()),
    ]
}

fn write_zip(dir: &Path, name: &str, entries: &[(String, String)]) {
    let file = File::create(dir.join(name)).unwrap();
    let mut zip = ZipWriter::new(file);
    for (path, content) in entries {
        zip.start_file(path.as_str(), SimpleFileOptions::default()).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
}

fn without(entries: Vec<(String, String)>, path: &str) -> Vec<(String, String)> {
    entries.into_iter().filter(|(p, _)| p != path).collect()
}

#[test]
fn complete_site_is_all_good() {
    let dir = tempfile::tempdir().unwrap();
    write_zip(dir.path(), "student.zip", &complete_site());

    let report = Grader::default().grade_batch(dir.path()).unwrap();

    assert_eq!(report.render(), "student.zip all good.\n\n");
    assert!(report.diagnostics.is_empty());
}

#[test]
fn archives_are_reported_in_sorted_order() {
    let dir = tempfile::tempdir().unwrap();
    write_zip(dir.path(), "b.zip", &complete_site());
    write_zip(dir.path(), "a.zip", &[("index.html".to_string(), "<p>x</p>".to_string())]);
    fs::write(dir.path().join("notes.txt"), "not an archive").unwrap();
    fs::write(dir.path().join(".DS_Store"), "").unwrap();
    fs::write(dir.path().join("Grading_Results.txt"), "old run").unwrap();

    let report = Grader::default().grade_batch(dir.path()).unwrap();
    let text = report.render();

    let a = text.find("File: a.zip").unwrap();
    let b = text.find("b.zip all good.").unwrap();
    assert!(a < b, "{}", text);
    assert_eq!(report.sites.len(), 2);
    assert_eq!(report.diagnostics.len(), 1);
    assert!(report.diagnostics[0].contains("notes.txt"));
    assert!(report.diagnostics[0].ends_with("is not a zip file; please assess."));
}

#[test]
fn too_few_html_files_reports_the_count() {
    let dir = tempfile::tempdir().unwrap();
    write_zip(dir.path(), "s.zip", &without(complete_site(), "site/contact.html"));

    let report = Grader::default().grade_batch(dir.path()).unwrap();
    let site = &report.sites[0];
    let messages: Vec<_> = site.findings().map(|f| f.message.as_str()).collect();

    assert!(messages.contains(&"Only 3 HTML files."), "{:?}", messages);
    assert!(messages.contains(&"Broken nav link: contact.html"), "{:?}", messages);
}

#[test]
fn missing_stylesheet_skips_css_checks() {
    let dir = tempfile::tempdir().unwrap();
    write_zip(dir.path(), "s.zip", &without(complete_site(), "site/css/style.css"));

    let report = Grader::default().grade_batch(dir.path()).unwrap();
    let site = &report.sites[0];
    let messages: Vec<_> = site.findings().map(|f| f.message.as_str()).collect();

    assert_eq!(messages, vec!["Does not have a CSS file."]);
    assert!(!site.sections.iter().any(|s| matches!(s.scope, Scope::Css(_))));
}

#[test]
fn one_heading_level_everywhere_is_not_enough() {
    let dir = tempfile::tempdir().unwrap();
    let site: Vec<(String, String)> = complete_site()
        .into_iter()
        .map(|(path, content)| (path, content.replace("<h2>About me</h2>", "<h1>About me</h1>")))
        .collect();
    write_zip(dir.path(), "s.zip", &site);

    let report = Grader::default().grade_batch(dir.path()).unwrap();

    assert_eq!(
        report.render(),
        "File: s.zip\n\tSite does not have two levels of heading tags.\n\n"
    );
}

#[test]
fn page_problems_are_grouped_under_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let site: Vec<(String, String)> = complete_site()
        .into_iter()
        .map(|(path, content)| {
            if path == "site/about.html" {
                let broken = content
                    .replace("<title>About</title>\n", "")
                    .replace("<h2>About me</h2>", "<h2>About me</h2>\n<img src=\"img/dog.png\">");
                (path, broken)
            } else {
                (path, content)
            }
        })
        .collect();
    write_zip(dir.path(), "s.zip", &site);

    let report = Grader::default().grade_batch(dir.path()).unwrap();

    assert_eq!(
        report.render(),
        "File: s.zip\n\
         \tsite/about.html HTML errors:\n\
         \tNo <title> element.\n\
         \tImage file img/dog.png called but appears not to exist.\n\
         \tNo alt text: <img src=\"img/dog.png\">\n\n"
    );
}

#[test]
fn stylesheet_problems_are_grouped_under_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let site: Vec<(String, String)> = complete_site()
        .into_iter()
        .map(|(path, content)| {
            if path == "site/css/style.css" {
                (path, "div.body { margin: 0 }\np { font-family: serif }\n".to_string())
            } else {
                (path, content)
            }
        })
        .collect();
    write_zip(dir.path(), "s.zip", &site);

    let report = Grader::default().grade_batch(dir.path()).unwrap();

    assert_eq!(
        report.render(),
        "File: s.zip\n\
         \tsite/css/style.css CSS errors:\n\
         \tNo font set to sans-serif anywhere.\n\
         \tNo margin on <body>.\n\
         \tBackground color not changed.\n\n"
    );
}

#[test]
fn unreadable_archive_does_not_stop_the_batch() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.zip"), "this is not a zip file").unwrap();
    write_zip(dir.path(), "b.zip", &complete_site());

    let report = Grader::default().grade_batch(dir.path()).unwrap();
    let text = report.render();

    assert!(text.starts_with("File: a.zip\n\tArchive could not be read: "), "{}", text);
    assert!(text.ends_with("b.zip all good.\n\n"), "{}", text);
}

// Rewrites the uncompressed size in every zip64 extra field (tag 0x0001)
// whose recorded size is `actual`. Returns how many fields were rewritten.
fn forge_zip64_sizes(bytes: &mut [u8], actual: u64, forged: u64) -> usize {
    let mut rewritten = 0;
    for at in 0..bytes.len().saturating_sub(12) {
        let tag = u16::from_le_bytes([bytes[at], bytes[at + 1]]);
        let len = u16::from_le_bytes([bytes[at + 2], bytes[at + 3]]);
        let size = u64::from_le_bytes(bytes[at + 4..at + 12].try_into().unwrap());
        if tag == 0x0001 && len >= 8 && size == actual {
            bytes[at + 4..at + 12].copy_from_slice(&forged.to_le_bytes());
            rewritten += 1;
        }
    }
    rewritten
}

#[test]
fn forged_entry_size_does_not_stop_the_batch() {
    let dir = tempfile::tempdir().unwrap();
    let body = "<p>an entry whose header lies about its size</p>";
    let path = dir.path().join("a.zip");
    let mut zip = ZipWriter::new(File::create(&path).unwrap());
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Stored)
        .large_file(true);
    zip.start_file("index.html", options).unwrap();
    zip.write_all(body.as_bytes()).unwrap();
    zip.finish().unwrap();

    let mut bytes = fs::read(&path).unwrap();
    let rewritten = forge_zip64_sizes(&mut bytes, body.len() as u64, 1 << 62);
    assert!(rewritten > 0, "no zip64 size field found");
    fs::write(&path, bytes).unwrap();
    write_zip(dir.path(), "b.zip", &complete_site());

    let report = Grader::default().grade_batch(dir.path()).unwrap();
    let text = report.render();

    assert_eq!(report.sites.len(), 2);
    assert!(text.starts_with("File: a.zip\n"), "{}", text);
    assert!(text.ends_with("b.zip all good.\n\n"), "{}", text);
}

#[test]
fn submission_named_like_the_report_is_graded() {
    let dir = tempfile::tempdir().unwrap();
    write_zip(dir.path(), "Grading_Results.zip", &complete_site());
    fs::write(dir.path().join("Grading_Results.txt"), "old run").unwrap();
    fs::write(dir.path().join("Grading_Results.json"), "{}").unwrap();

    let report = Grader::default().grade_batch(dir.path()).unwrap();

    assert_eq!(report.render(), "Grading_Results.zip all good.\n\n");
    assert!(report.diagnostics.is_empty(), "{:?}", report.diagnostics);
}

#[test]
fn rubric_file_overrides_thresholds() {
    let dir = tempfile::tempdir().unwrap();
    let rubric_path = dir.path().join("rubric.toml");
    fs::write(&rubric_path, "min_html_files = 5\nreport_file_name = \"results.txt\"\n").unwrap();
    write_zip(dir.path(), "s.zip", &complete_site());

    let rubric = Rubric::load(&rubric_path).unwrap();
    let report = Grader::new(rubric).grade_batch(dir.path()).unwrap();

    assert_eq!(report.render(), "File: s.zip\n\tOnly 4 HTML files.\n\n");
    assert_eq!(report.diagnostics.len(), 1, "rubric.toml is not an archive");
}
