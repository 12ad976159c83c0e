/// Base name used when a template does not carry its own file name.
pub const DEFAULT_FILE_NAME: &str = "New File";

/// Cosmetic icon attached to a template or menu entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateIcon {
    Swift,
    Text,
    Markdown,
    Metal,
    Json,
    Plist,
    Terminal,
}

impl TemplateIcon {
    pub fn glyph(&self) -> &'static str {
        match self {
            TemplateIcon::Swift => "sw",
            TemplateIcon::Text => "tx",
            TemplateIcon::Markdown => "md",
            TemplateIcon::Metal => "mt",
            TemplateIcon::Json => "{}",
            TemplateIcon::Plist => "<>",
            TemplateIcon::Terminal => ">_",
        }
    }
}

/// A static recipe for stamping out one new file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTemplate {
    pub display_name: &'static str,
    pub file_name: Option<&'static str>,
    /// Extension without the leading dot.
    pub file_extension: &'static str,
    pub icon: Option<TemplateIcon>,
    pub content: &'static str,
    #[allow(dead_code)] // reserved filter flag, every catalog entry is enabled
    pub is_enabled: bool,
}

impl FileTemplate {
    fn new(
        display_name: &'static str,
        file_extension: &'static str,
        icon: TemplateIcon,
        content: &'static str,
    ) -> Self {
        Self {
            display_name,
            file_name: None,
            file_extension,
            icon: Some(icon),
            content,
            is_enabled: true,
        }
    }

    /// `<file_name or "New File">.<file_extension>`
    pub fn target_file_name(&self) -> String {
        format!(
            "{}.{}",
            self.file_name.unwrap_or(DEFAULT_FILE_NAME),
            self.file_extension
        )
    }
}

mod content {
    pub const SWIFT: &str = "import Foundation\n\nprint(\"Hello, World!\")\n";

    pub const MARKDOWN: &str = "# Title\n\n";

    pub const GENERIC: &str = "";

    pub const PLIST: &str = concat!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
        "<!DOCTYPE plist PUBLIC \"-//Apple//DTD PLIST 1.0//EN\" ",
        "\"http://www.apple.com/DTDs/PropertyList-1.0.dtd\">\n",
        "<plist version=\"1.0\">\n",
        "<dict>\n",
        "</dict>\n",
        "</plist>",
    );

    pub const METAL: &str = "#include <metal_stdlib>\nusing namespace metal;\n\n";
}

/// The fixed, ordered list of templates offered under "New File".
///
/// Position in the list is the only identity a template has: menu entries are
/// tagged with their index and resolved back through this same list.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateCatalog;

impl TemplateCatalog {
    pub fn templates(&self) -> Vec<FileTemplate> {
        vec![
            FileTemplate::new("Swift File", "swift", TemplateIcon::Swift, content::SWIFT),
            FileTemplate::new("Text File", "txt", TemplateIcon::Text, content::GENERIC),
            FileTemplate::new(
                "Markdown File",
                "md",
                TemplateIcon::Markdown,
                content::MARKDOWN,
            ),
            FileTemplate::new("Metal File", "metal", TemplateIcon::Metal, content::METAL),
            FileTemplate::new("JSON File", "json", TemplateIcon::Json, content::GENERIC),
            FileTemplate::new("Plist File", "plist", TemplateIcon::Plist, content::PLIST),
        ]
    }

    pub fn get(&self, index: usize) -> Option<FileTemplate> {
        self.templates().into_iter().nth(index)
    }

    pub fn len(&self) -> usize {
        self.templates().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_is_non_empty_and_stable() {
        let catalog = TemplateCatalog;
        let first = catalog.templates();
        let second = catalog.templates();

        assert!(!first.is_empty());
        assert_eq!(first, second);
        assert_eq!(catalog.len(), 6);
    }

    #[test]
    fn catalog_order_matches_menu_order() {
        let names: Vec<_> = TemplateCatalog
            .templates()
            .iter()
            .map(|t| t.display_name)
            .collect();

        assert_eq!(
            names,
            [
                "Swift File",
                "Text File",
                "Markdown File",
                "Metal File",
                "JSON File",
                "Plist File"
            ]
        );
    }

    #[test]
    fn entries_are_well_formed() {
        for template in TemplateCatalog.templates() {
            assert!(!template.display_name.is_empty());
            assert!(!template.file_extension.is_empty());
            assert!(!template.file_extension.starts_with('.'));
            assert!(template.is_enabled);
        }
    }

    #[test]
    fn target_file_name_defaults_base_name() {
        let swift = TemplateCatalog.get(0).unwrap();
        assert_eq!(swift.target_file_name(), "New File.swift");

        let custom = FileTemplate {
            file_name: Some("Package"),
            ..swift
        };
        assert_eq!(custom.target_file_name(), "Package.swift");
    }

    #[test]
    fn swift_template_is_hello_world() {
        let swift = TemplateCatalog.get(0).unwrap();
        assert_eq!(
            swift.content,
            "import Foundation\n\nprint(\"Hello, World!\")\n"
        );
    }

    #[test]
    fn plist_template_is_minimal_document() {
        let plist = TemplateCatalog.get(5).unwrap();
        assert_eq!(plist.display_name, "Plist File");
        assert!(plist.content.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n"));
        assert!(plist.content.contains("<plist version=\"1.0\">\n<dict>\n</dict>\n</plist>"));
        assert!(plist.content.ends_with("</plist>"));
    }

    #[test]
    fn out_of_range_lookup_is_none() {
        assert!(TemplateCatalog.get(6).is_none());
    }
}
