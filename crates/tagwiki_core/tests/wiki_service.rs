use std::cell::RefCell;
use tagwiki_core::{
    Page, PageRepository, SqlitePageStore, StoreError, StoreResult, ViewOutcome, WikiService,
};

fn service() -> WikiService<SqlitePageStore> {
    WikiService::new(SqlitePageStore::open_in_memory().unwrap())
}

#[test]
fn view_of_missing_page_redirects_to_edit() {
    let service = service();
    assert_eq!(
        service.load_page_for_view("NewTopic").unwrap(),
        ViewOutcome::RedirectToEdit("NewTopic".to_string())
    );
}

#[test]
fn edit_of_missing_page_returns_blank_template() {
    let service = service();
    let page = service.load_page_for_edit("NewTopic").unwrap();
    assert_eq!(page, Page::blank("NewTopic"));
    assert_eq!(page.rendered_timestamp(), "");
}

#[test]
fn saved_page_renders_for_view() {
    let service = service();
    let saved = service
        .save_page("Rust", "See [Cargo] and [Crates]", "lang, systems")
        .unwrap();
    assert_eq!(saved.tags, vec!["lang".to_string(), "systems".to_string()]);
    assert!(saved.timestamp.is_some());

    let ViewOutcome::Render(rendered) = service.load_page_for_view("Rust").unwrap() else {
        panic!("saved page should render");
    };
    assert_eq!(
        rendered.rendered_body,
        "See <a href=\"/view/Cargo\">Cargo</a> and <a href=\"/view/Crates\">Crates</a>"
    );
    assert_eq!(rendered.rendered_tags, "lang, systems");
    assert_eq!(rendered.rendered_timestamp, saved.rendered_timestamp());
    assert!(rendered.rendered_timestamp.ends_with("(UTC)"));
}

#[test]
fn saving_with_empty_tag_string_clears_tags() {
    let service = service();
    service.save_page("Topic", "v1", "a, b").unwrap();
    service.save_page("Topic", "v2", "").unwrap();

    let page = service.load_page_for_edit("Topic").unwrap();
    assert_eq!(page.body, "v2");
    assert!(page.tags.is_empty());
    assert!(service.distinct_tags().unwrap().is_empty());
}

#[test]
fn tag_browsing_lists_rendered_pages() {
    let service = service();
    service.save_page("Beta", "[Alpha]", "greek").unwrap();
    service.save_page("Alpha", "first", "greek, letters").unwrap();
    service.save_page("Other", "", "misc").unwrap();

    assert_eq!(
        service.distinct_tags().unwrap(),
        vec!["greek".to_string(), "letters".to_string(), "misc".to_string()]
    );

    let tagged = service.pages_tagged("greek").unwrap();
    let titles: Vec<&str> = tagged.iter().map(|page| page.title.as_str()).collect();
    assert_eq!(titles, vec!["Alpha", "Beta"]);
    assert_eq!(tagged[1].rendered_body, "<a href=\"/view/Alpha\">Alpha</a>");

    assert_eq!(
        service.list_titles().unwrap(),
        vec!["Alpha".to_string(), "Beta".to_string(), "Other".to_string()]
    );
}

struct FailingRepo {
    saves: RefCell<usize>,
}

impl PageRepository for FailingRepo {
    fn load(&self, title: &str) -> StoreResult<Page> {
        Err(StoreError::InvalidData(format!("cannot decode {title}")))
    }

    fn save(&self, _page: &mut Page) -> StoreResult<()> {
        *self.saves.borrow_mut() += 1;
        Err(StoreError::Write(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_FULL),
            Some("database or disk is full".to_string()),
        )))
    }

    fn distinct_tags(&self) -> StoreResult<Vec<String>> {
        Ok(Vec::new())
    }

    fn pages_tagged(&self, _tag: &str) -> StoreResult<Vec<Page>> {
        Ok(Vec::new())
    }

    fn list_titles(&self) -> StoreResult<Vec<String>> {
        Ok(Vec::new())
    }
}

#[test]
fn store_failures_propagate_without_retry() {
    let repo = FailingRepo {
        saves: RefCell::new(0),
    };
    let service = WikiService::new(&repo);

    assert!(matches!(
        service.load_page_for_view("X"),
        Err(StoreError::InvalidData(_))
    ));
    assert!(matches!(
        service.load_page_for_edit("X"),
        Err(StoreError::InvalidData(_))
    ));
    assert!(matches!(
        service.save_page("X", "body", ""),
        Err(StoreError::Write(_))
    ));
    assert_eq!(*repo.saves.borrow(), 1);
}
