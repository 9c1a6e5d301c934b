//! Integration tests: files, records, registration and rendering together
//!
//! Each test builds a small site on disk (a child root and a parent root, each
//! with block files and templates), loads it through a [`BlockLoader`],
//! registers the blocks and renders them the way a host would.

#[cfg(test)]
mod integration_tests {
    use std::collections::HashMap;
    use std::fs;
    use std::path::Path;
    use std::sync::Arc;

    use serde_json::json;
    use tempfile::TempDir;

    use crate::config::LoaderConfig;
    use crate::core::block::Attributes;
    use crate::core::registry::BlockRegistry;
    use crate::runtime::output::{OutputFilters, UserRecord};
    use crate::runtime::render::RenderContext;
    use crate::runtime::BlockLoader;
    use crate::source::{ContentRecord, MemoryContentStore, TemplateLocator};

    struct Site {
        child: TempDir,
        parent: TempDir,
    }

    impl Site {
        fn new() -> Self {
            Self {
                child: TempDir::new().unwrap(),
                parent: TempDir::new().unwrap(),
            }
        }

        fn locator(&self) -> TemplateLocator {
            TemplateLocator::new([self.child.path(), self.parent.path()])
        }
    }

    fn write(root: &Path, relative: &str, contents: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn users() -> HashMap<String, UserRecord> {
        let mut users = HashMap::new();
        users.insert("jdoe".to_string(), UserRecord::new(42, "jdoe", "Jane Doe"));
        users
    }

    /// A full pass: parent file, child override, stored record, Liquid templates.
    #[test]
    fn test_site_render() {
        let site = Site::new();

        write(
            site.parent.path(),
            "blocks/blocks.json",
            &json!({
                "testimonial": {
                    "name": "testimonial",
                    "title": "Testimonial",
                    "fields": {
                        "quote": { "name": "quote", "default": "Great!" },
                        "author": { "name": "author", "control": "user" },
                        "tags": { "name": "tags", "type": "array", "default": ["a"] }
                    }
                },
                "2_col": { "name": "two-col" }
            })
            .to_string(),
        );
        write(
            site.child.path(),
            "blocks/blocks.json",
            &json!({ "2_col": { "name": "columns" } }).to_string(),
        );
        write(
            site.parent.path(),
            "blocks/block-testimonial.liquid",
            "<blockquote>{{ attributes.quote }}</blockquote><cite>{{ fields.author }}</cite>",
        );
        write(site.child.path(), "blocks/block-columns.liquid", "columns");

        let store = MemoryContentStore::new();
        store.insert(ContentRecord::published(
            10,
            json!({ "banner": { "name": "banner" } }).to_string(),
        ));

        let filters = OutputFilters::with_users(users());
        let mut loader = BlockLoader::with_liquid(LoaderConfig::default(), site.locator(), filters)
            .unwrap()
            .with_store(Arc::new(store));

        let loaded = loader.retrieve_blocks();
        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded.get("2_col").unwrap().name, "columns");

        let mut registry = BlockRegistry::new();
        assert_eq!(loader.register_all(&mut registry), 3);
        assert_eq!(
            registry.identifiers(),
            vec!["banner", "block-2-col", "testimonial"]
        );

        let schema = &registry.get("testimonial").unwrap().attributes;
        assert_eq!(
            serde_json::to_value(schema).unwrap(),
            json!({
                "quote": { "type": "string", "default": "Great!" },
                "author": { "type": "string" },
                "tags": { "type": "array", "items": { "type": "string" } }
            })
        );

        let mut supplied = Attributes::new();
        supplied.insert("author".into(), json!("jdoe"));
        let out = registry
            .render("testimonial", &supplied, &RenderContext::from_request(None))
            .unwrap();
        assert_eq!(out, "<blockquote>Great!</blockquote><cite>Jane Doe</cite>");

        let out = registry
            .render("block-2-col", &Attributes::new(), &RenderContext::front_end())
            .unwrap();
        assert_eq!(out, "columns");

        let out = registry
            .render("banner", &Attributes::new(), &RenderContext::front_end())
            .unwrap();
        assert!(out.contains("blocks/block-banner.liquid"));
    }

    /// A broken child file leaves the parent's blocks in place.
    #[test]
    fn test_broken_child_file() {
        let site = Site::new();
        write(
            site.parent.path(),
            "blocks/blocks.json",
            r#"{"hero": {"name": "hero"}}"#,
        );
        write(site.child.path(), "blocks/blocks.json", "{ broken");

        let mut loader =
            BlockLoader::with_liquid(LoaderConfig::default(), site.locator(), OutputFilters::new())
                .unwrap();

        let loaded = loader.retrieve_blocks();
        assert_eq!(loaded.len(), 1);
        assert!(loaded.get("hero").is_some());
    }

    /// A record whose block has `"fields": []` loads with the rest of its blocks.
    #[test]
    fn test_record_with_empty_field_list() {
        let site = Site::new();
        write(site.parent.path(), "blocks/block-spacer.liquid", "<hr>");

        let store = MemoryContentStore::new();
        store.insert(ContentRecord::published(
            7,
            json!({
                "hero": { "name": "hero", "fields": { "h": { "name": "h", "default": "Hi" } } },
                "spacer": { "name": "spacer", "fields": [] }
            })
            .to_string(),
        ));

        let mut loader =
            BlockLoader::with_liquid(LoaderConfig::default(), site.locator(), OutputFilters::new())
                .unwrap()
                .with_store(Arc::new(store));

        let loaded = loader.retrieve_blocks();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.get("spacer").unwrap().field_count(), 0);

        let mut registry = BlockRegistry::new();
        loader.register_all(&mut registry);
        assert!(registry.get("spacer").unwrap().attributes.is_empty());

        let out = registry
            .render("spacer", &Attributes::new(), &RenderContext::front_end())
            .unwrap();
        assert_eq!(out, "<hr>");
    }

    /// Only published records of the configured type are loaded.
    #[test]
    fn test_unpublished_records_are_ignored() {
        let site = Site::new();

        let mut draft = ContentRecord::published(2, r#"{"draft": {"name": "draft"}}"#);
        draft.post_status = "draft".into();

        let store: MemoryContentStore = vec![
            ContentRecord::published(1, r#"{"live": {"name": "live"}}"#),
            draft,
        ]
        .into_iter()
        .collect();

        let mut loader =
            BlockLoader::with_liquid(LoaderConfig::default(), site.locator(), OutputFilters::new())
                .unwrap()
                .with_store(Arc::new(store));

        let loaded = loader.retrieve_blocks();
        assert!(loaded.get("live").is_some());
        assert!(loaded.get("draft").is_none());
    }

    /// Reloading picks up changes; blocks registered earlier keep their definition.
    #[test]
    fn test_reload_does_not_touch_registered_blocks() {
        let site = Site::new();
        write(
            site.parent.path(),
            "blocks/blocks.json",
            r#"{"hero": {"name": "hero", "fields": {"h": {"default": "old"}}}}"#,
        );
        write(site.parent.path(), "blocks/block-hero.liquid", "{{ attributes.h }}");

        let mut loader =
            BlockLoader::with_liquid(LoaderConfig::default(), site.locator(), OutputFilters::new())
                .unwrap();
        loader.retrieve_blocks();

        let mut registry = BlockRegistry::new();
        loader.register_all(&mut registry);

        write(
            site.parent.path(),
            "blocks/blocks.json",
            r#"{"hero": {"name": "hero", "fields": {"h": {"default": "new"}}}}"#,
        );
        loader.retrieve_blocks();
        assert!(loader.blocks().json().contains("new"));

        let out = registry
            .render("hero", &Attributes::new(), &RenderContext::front_end())
            .unwrap();
        assert_eq!(out, "old");
    }

    /// A custom config changes the template layout and the preview marker.
    #[test]
    fn test_custom_config() {
        let site = Site::new();
        let config = LoaderConfig::from_json(
            &json!({
                "blocks_file": "defs.json",
                "template_dir": "tpl",
                "template_extension": "html",
                "edit_context": "preview"
            })
            .to_string(),
        )
        .unwrap();

        write(site.parent.path(), "defs.json", r#"{"hero": {"name": "hero"}}"#);
        write(site.parent.path(), "tpl/preview-hero.html", "preview");
        write(site.parent.path(), "tpl/block-hero.html", "block");

        let mut loader =
            BlockLoader::with_liquid(config, site.locator(), OutputFilters::new()).unwrap();
        loader.retrieve_blocks();

        let mut registry = BlockRegistry::new();
        loader.register_all(&mut registry);

        let context = loader.render_context(Some("preview"));
        let out = registry.render("hero", &Attributes::new(), &context).unwrap();
        assert_eq!(out, "preview");

        let context = loader.render_context(Some("edit"));
        let out = registry.render("hero", &Attributes::new(), &context).unwrap();
        assert_eq!(out, "block");
    }
}
