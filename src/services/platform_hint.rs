use crate::domain::Platform;
use std::path::Path;
use tracing::debug;

/// Folder-name keywords and the platform-name fragments they stand for.
/// Keywords match whole words of the folder name (multi-word keywords match
/// as a phrase), so "snes" does not fire on a stray "nes".
const PLATFORM_KEYWORDS: &[(&str, &[&str])] = &[
    ("nes", &["nintendo entertainment system", "nes"]),
    ("famicom", &["nintendo entertainment system", "famicom"]),
    ("snes", &["super nintendo"]),
    ("super nintendo", &["super nintendo"]),
    ("super famicom", &["super nintendo", "famicom"]),
    ("gameboy", &["game boy"]),
    ("game boy", &["game boy"]),
    ("gba", &["game boy advance"]),
    ("gbc", &["game boy color"]),
    ("n64", &["nintendo 64"]),
    ("nintendo 64", &["nintendo 64"]),
    ("nds", &["nintendo ds"]),
    ("genesis", &["genesis", "mega drive"]),
    ("megadrive", &["mega drive", "genesis"]),
    ("mega drive", &["mega drive", "genesis"]),
    ("32x", &["32x"]),
    ("master system", &["master system"]),
    ("game gear", &["game gear"]),
    ("saturn", &["saturn"]),
    ("dreamcast", &["dreamcast"]),
    ("playstation", &["playstation"]),
    ("psx", &["playstation"]),
    ("ps1", &["playstation"]),
    ("pc engine", &["pc engine", "turbografx"]),
    ("turbografx", &["turbografx", "pc engine"]),
    ("neo geo", &["neo geo"]),
    ("neogeo", &["neo geo"]),
    ("wonderswan", &["wonderswan"]),
    ("virtual boy", &["virtual boy"]),
    ("lynx", &["lynx"]),
    ("2600", &["atari 2600"]),
    ("7800", &["atari 7800"]),
    ("coleco", &["colecovision"]),
];

/// Majority-extension fallback table: extension to the platform names it
/// commonly belongs to, most specific first.
const EXTENSION_PLATFORMS: &[(&str, &[&str])] = &[
    ("nes", &["Nintendo Entertainment System", "NES"]),
    ("fds", &["Famicom Disk System"]),
    ("sfc", &["Super Nintendo", "SNES"]),
    ("smc", &["Super Nintendo", "SNES"]),
    ("gb", &["Game Boy"]),
    ("gbc", &["Game Boy Color"]),
    ("gba", &["Game Boy Advance"]),
    ("nds", &["Nintendo DS"]),
    ("n64", &["Nintendo 64"]),
    ("z64", &["Nintendo 64"]),
    ("v64", &["Nintendo 64"]),
    ("md", &["Mega Drive", "Genesis"]),
    ("gen", &["Genesis", "Mega Drive"]),
    ("smd", &["Mega Drive", "Genesis"]),
    ("32x", &["Sega 32X"]),
    ("sms", &["Master System"]),
    ("gg", &["Game Gear"]),
    ("sg", &["SG-1000"]),
    ("iso", &["PlayStation", "Sega Saturn", "Sega CD"]),
    ("bin", &["PlayStation", "Sega CD", "Atari 2600"]),
    ("cue", &["PlayStation", "Sega CD"]),
    ("pce", &["PC Engine", "TurboGrafx-16"]),
    ("ngp", &["Neo Geo Pocket"]),
    ("ngc", &["Neo Geo Pocket Color"]),
    ("ws", &["WonderSwan"]),
    ("wsc", &["WonderSwan Color"]),
    ("a26", &["Atari 2600"]),
    ("a78", &["Atari 7800"]),
    ("lnx", &["Atari Lynx"]),
    ("col", &["ColecoVision"]),
    ("vb", &["Virtual Boy"]),
    ("min", &["Pokemon Mini"]),
];

/// Guess which platform a batch of files belongs to. Advisory only: the
/// answer is a suggestion for the caller to confirm, never something to act
/// on unprompted. Folder-name evidence wins over extension majority, and
/// the supplied platform order breaks every tie.
pub fn suggest<'a>(
    root_dir_name: &str,
    filenames: &[String],
    platforms: &'a [Platform],
) -> Option<&'a Platform> {
    if let Some(platform) = suggest_by_folder_name(root_dir_name, platforms) {
        debug!(platform = %platform.name, "suggested via folder name");
        return Some(platform);
    }
    let platform = suggest_by_extension_majority(filenames, platforms);
    if let Some(platform) = platform {
        debug!(platform = %platform.name, "suggested via extension majority");
    }
    platform
}

fn suggest_by_folder_name<'a>(root_dir_name: &str, platforms: &'a [Platform]) -> Option<&'a Platform> {
    let folder = root_dir_name.to_lowercase();
    if folder.is_empty() {
        return None;
    }

    for platform in platforms {
        let name = platform.name.to_lowercase();
        if folder.contains(&name) || name.contains(&folder) {
            return Some(platform);
        }
        for (keyword, fragments) in PLATFORM_KEYWORDS {
            if folder_has_keyword(&folder, keyword)
                && fragments.iter().any(|f| fragment_matches_name(f, &name))
            {
                return Some(platform);
            }
        }
    }
    None
}

fn folder_has_keyword(folder: &str, keyword: &str) -> bool {
    if keyword.contains(' ') {
        return folder.contains(keyword);
    }
    folder
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| word == keyword)
}

fn fragment_matches_name(fragment: &str, name: &str) -> bool {
    if name.contains(fragment) {
        return true;
    }
    // Single-word fragments also match on a shared prefix stem.
    !fragment.contains(' ')
        && name
            .split_whitespace()
            .any(|word| word.starts_with(fragment) || fragment.starts_with(word))
}

fn suggest_by_extension_majority<'a>(
    filenames: &[String],
    platforms: &'a [Platform],
) -> Option<&'a Platform> {
    // Count in input order; only a strictly higher count displaces the
    // current leader, so earlier extensions win ties.
    let mut counts: Vec<(String, usize)> = Vec::new();
    for filename in filenames {
        let Some(ext) = Path::new(filename).extension() else {
            continue;
        };
        let ext = ext.to_string_lossy().to_lowercase();
        match counts.iter_mut().find(|(seen, _)| *seen == ext) {
            Some((_, count)) => *count += 1,
            None => counts.push((ext, 1)),
        }
    }

    let mut leader: Option<(&str, usize)> = None;
    for (ext, count) in &counts {
        if leader.is_none_or(|(_, best)| *count > best) {
            leader = Some((ext, *count));
        }
    }
    let (leading_ext, _) = leader?;

    let candidates = EXTENSION_PLATFORMS
        .iter()
        .find(|(ext, _)| *ext == leading_ext)
        .map(|(_, names)| *names)?;

    platforms.iter().find(|platform| {
        candidates
            .iter()
            .any(|candidate| fuzzy_name_match(candidate, &platform.name))
    })
}

/// Case-insensitive substring either way, or at least half of one name's
/// significant words sharing a prefix stem with a word of the other.
fn fuzzy_name_match(a: &str, b: &str) -> bool {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    if a.contains(&b) || b.contains(&a) {
        return true;
    }
    half_words_overlap(&a, &b) || half_words_overlap(&b, &a)
}

fn half_words_overlap(a: &str, b: &str) -> bool {
    let significant: Vec<&str> = a.split_whitespace().filter(|w| w.len() > 2).collect();
    if significant.is_empty() {
        return false;
    }
    let b_words: Vec<&str> = b.split_whitespace().collect();
    let matched = significant
        .iter()
        .filter(|word| {
            b_words
                .iter()
                .any(|other| other.starts_with(**word) || word.starts_with(*other))
        })
        .count();
    matched * 2 >= significant.len()
}
