//! # ttglyph CLI
//!
//! Usage:
//!   ttglyph --font Font.ttf --unicodes font.xml --all
//!   ttglyph --font Font.ttf --unicode e9aa
//!   ttglyph --font Font.ttf --unicodes font.xml --expected font_digest.json
//!   ttglyph --font Font.ttf --unicodes font.xml --all --digest crc32

use std::{
    fs,
    path::{Path, PathBuf},
    process,
};

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use log::info;
use ttglyph::{
    Font,
    assets::{self, FontUnicode},
    check,
    digest::{Crc32Digest, GlyphDigest, Md5Digest, encode_hex, parse_codepoint_hex},
};

/// Exit status when a configured character has no glyph or a digest differs
const MISSING_GLYPH_EXIT_CODE: i32 = -102;

#[derive(Debug, Parser)]
#[command(
    name = "ttglyph",
    version,
    about = "Resolve characters to TrueType glyph outlines and digest them"
)]
struct Args {
    /// The TrueType font to read
    #[arg(short, long)]
    font: PathBuf,

    /// String resource xml naming the characters of interest
    #[arg(short = 'x', long)]
    unicodes: Option<PathBuf>,

    /// Generate the digest of every configured character
    #[arg(short, long)]
    all: bool,

    /// Generate the digest of a single character, given in hex
    #[arg(short, long)]
    unicode: Option<String>,

    /// Verify the configured characters against a digest table
    #[arg(short, long)]
    expected: Option<PathBuf>,

    /// Digest used to print and compare glyph outlines
    #[arg(short, long, value_enum, default_value_t = DigestKind::Md5)]
    digest: DigestKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum DigestKind {
    Md5,
    Crc32,
}

impl GlyphDigest for DigestKind {
    fn digest(&self, bytes: &[u8]) -> String {
        match self {
            DigestKind::Md5 => Md5Digest.digest(bytes),
            DigestKind::Crc32 => Crc32Digest.digest(bytes),
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let data = fs::read(&args.font)
        .with_context(|| format!("Failed to read font {}", args.font.display()))?;
    let font = Font::new(&data);
    info!(
        "{} tables, {} glyphs",
        font.tables().map_or(0, |tables| tables.len()),
        font.glyph_count().unwrap_or(0)
    );

    let mut ok = true;
    if let Some(unicode) = &args.unicode {
        ok &= print_single(&font, unicode, args.digest)?;
    }
    if args.all {
        ok &= print_all(&font, &load_unicodes(&args)?, args.digest)?;
    }
    if let Some(expected) = &args.expected {
        ok &= verify(&font, &load_unicodes(&args)?, expected, args.digest)?;
    }
    if args.unicode.is_none() && !args.all && args.expected.is_none() {
        bail!("Nothing to do, pass --all, --unicode or --expected");
    }

    if !ok {
        process::exit(MISSING_GLYPH_EXIT_CODE);
    }
    Ok(())
}

fn load_unicodes(args: &Args) -> Result<Vec<FontUnicode>> {
    let Some(path) = &args.unicodes else {
        bail!("--unicodes is required to know which characters to digest");
    };
    let xml = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    assets::read_font_unicodes(&xml).with_context(|| format!("Failed to parse {}", path.display()))
}

fn print_single(font: &Font<'_>, unicode: &str, digest: DigestKind) -> Result<bool> {
    let Some(codepoint) = parse_codepoint_hex(unicode) else {
        bail!("'{unicode}' is not a hex code point");
    };
    let Some(glyph) = font.glyph_by_unicode(codepoint) else {
        eprintln!("unicode {codepoint:x}: no glyph");
        return Ok(false);
    };

    println!("unicode {codepoint:x}: glyph index = {}", glyph.index);
    println!("unicode {codepoint:x}: glyph buffer = {}", encode_hex(glyph.outline));
    println!(
        "unicode {codepoint:x}: glyph digest = {}",
        digest.digest(glyph.outline)
    );
    Ok(true)
}

fn print_all(font: &Font<'_>, unicodes: &[FontUnicode], digest: DigestKind) -> Result<bool> {
    let table = check::digest_table(font, unicodes, &digest);
    for unicode in &table.missing {
        eprintln!("{} ({:x}): no glyph", unicode.name, unicode.unicode);
    }
    if !table.is_complete() {
        eprintln!("the digest can't be missing");
        return Ok(false);
    }

    println!("{}", assets::write_font_digests(&table.digests)?);
    Ok(true)
}

fn verify(
    font: &Font<'_>,
    unicodes: &[FontUnicode],
    expected: &Path,
    digest: DigestKind,
) -> Result<bool> {
    let json = fs::read_to_string(expected)
        .with_context(|| format!("Failed to read {}", expected.display()))?;
    let expected = assets::read_font_digests(&json)
        .with_context(|| format!("Failed to parse {}", expected.display()))?;

    for (codepoint, names) in check::duplicate_codepoints(unicodes) {
        eprintln!("duplicated character {codepoint:x}: {}", names.join(", "));
    }
    for indices in check::duplicate_glyphs(font.glyphs()) {
        eprintln!("identical glyph outlines: {indices:?}");
    }
    if !check::glyph_count_matches(font, unicodes) {
        eprintln!(
            "font has {} glyphs for {} configured characters",
            font.glyph_count().unwrap_or(0),
            unicodes.len()
        );
    }

    let mismatches = check::verify_digests(font, unicodes, &expected, &digest);
    for mismatch in &mismatches {
        eprintln!("{mismatch}");
    }
    info!("{} characters checked, {} problems", unicodes.len(), mismatches.len());

    Ok(mismatches.is_empty())
}
