//! Named color themes for the preview and exported HTML

/// An sRGB color
pub type Rgb = [u8; 3];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewTheme {
    pub id: &'static str,
    pub name: &'static str,
    pub dark: bool,
    pub background: Rgb,
    pub text: Rgb,
    pub heading: Rgb,
    pub link: Rgb,
    pub code: Rgb,
    pub code_background: Rgb,
    pub blockquote: Rgb,
    pub border: Rgb,
}

pub const DEFAULT_THEME_ID: &str = "github-dark";

pub static PREVIEW_THEMES: [PreviewTheme; 6] = [
    PreviewTheme {
        id: "github-light",
        name: "GitHub Light",
        dark: false,
        background: [0xff, 0xff, 0xff],
        text: [0x24, 0x29, 0x2f],
        heading: [0x1f, 0x23, 0x28],
        link: [0x09, 0x69, 0xda],
        code: [0xd7, 0x3a, 0x49],
        code_background: [0xf6, 0xf8, 0xfa],
        blockquote: [0x65, 0x6d, 0x76],
        border: [0xd1, 0xd9, 0xe0],
    },
    PreviewTheme {
        id: "github-dark",
        name: "GitHub Dark",
        dark: true,
        background: [0x0d, 0x11, 0x17],
        text: [0xe6, 0xed, 0xf3],
        heading: [0xf0, 0xf6, 0xfc],
        link: [0x2f, 0x81, 0xf7],
        code: [0xff, 0x7b, 0x72],
        code_background: [0x16, 0x1b, 0x22],
        blockquote: [0x7d, 0x85, 0x90],
        border: [0x30, 0x36, 0x3d],
    },
    PreviewTheme {
        id: "glassmorphism",
        name: "Glassmorphism",
        dark: false,
        background: [0xee, 0xf1, 0xf8],
        text: [0x2d, 0x37, 0x48],
        heading: [0x1a, 0x20, 0x2c],
        link: [0x66, 0x7e, 0xea],
        code: [0x80, 0x5a, 0xd5],
        code_background: [0xe2, 0xe6, 0xf0],
        blockquote: [0x4a, 0x55, 0x68],
        border: [0xcb, 0xd5, 0xe0],
    },
    PreviewTheme {
        id: "sepia",
        name: "Sepia",
        dark: false,
        background: [0xf7, 0xf3, 0xe9],
        text: [0x5d, 0x4e, 0x37],
        heading: [0x3e, 0x2f, 0x1c],
        link: [0x8b, 0x45, 0x13],
        code: [0xa0, 0x52, 0x2d],
        code_background: [0xef, 0xe8, 0xd8],
        blockquote: [0x7a, 0x6a, 0x53],
        border: [0xd9, 0xcf, 0xbd],
    },
    PreviewTheme {
        id: "nord",
        name: "Nord",
        dark: true,
        background: [0x2e, 0x34, 0x40],
        text: [0xd8, 0xde, 0xe9],
        heading: [0xec, 0xef, 0xf4],
        link: [0x88, 0xc0, 0xd0],
        code: [0xa3, 0xbe, 0x8c],
        code_background: [0x3b, 0x42, 0x52],
        blockquote: [0x81, 0xa1, 0xc1],
        border: [0x4c, 0x56, 0x6a],
    },
    PreviewTheme {
        id: "dracula",
        name: "Dracula",
        dark: true,
        background: [0x28, 0x2a, 0x36],
        text: [0xf8, 0xf8, 0xf2],
        heading: [0xff, 0x79, 0xc6],
        link: [0x8b, 0xe9, 0xfd],
        code: [0x50, 0xfa, 0x7b],
        code_background: [0x44, 0x47, 0x5a],
        blockquote: [0xbd, 0x93, 0xf9],
        border: [0x62, 0x72, 0xa4],
    },
];

impl PreviewTheme {
    /// Theme with `id`, or the first theme for unknown ids
    pub fn by_id(id: &str) -> &'static PreviewTheme {
        PREVIEW_THEMES
            .iter()
            .find(|theme| theme.id == id)
            .unwrap_or(&PREVIEW_THEMES[0])
    }

    /// Stylesheet for exported pages
    pub fn css(&self) -> String {
        format!(
            "body {{ background: {}; color: {}; font-family: sans-serif; max-width: 50em; margin: 2em auto; padding: 0 1em; line-height: 1.6; }}\n\
             h1, h2, h3, h4, h5, h6 {{ color: {}; }}\n\
             a {{ color: {}; }}\n\
             code {{ color: {}; background: {}; padding: 0.1em 0.3em; border-radius: 3px; }}\n\
             pre {{ background: {}; padding: 1em; overflow-x: auto; }}\n\
             pre code {{ padding: 0; }}\n\
             blockquote {{ color: {}; border-left: 4px solid {}; margin-left: 0; padding-left: 1em; }}\n\
             table, th, td {{ border: 1px solid {}; border-collapse: collapse; padding: 0.3em 0.6em; }}\n\
             img {{ max-width: 100%; }}\n",
            hex(self.background),
            hex(self.text),
            hex(self.heading),
            hex(self.link),
            hex(self.code),
            hex(self.code_background),
            hex(self.code_background),
            hex(self.blockquote),
            hex(self.border),
            hex(self.border),
        )
    }
}

/// `#rrggbb` form of a color
pub fn hex([r, g, b]: Rgb) -> String {
    format!("#{r:02x}{g:02x}{b:02x}")
}
