use assert_fs::TempDir;
use assert_fs::prelude::{FileWriteStr, PathChild};
use derive_new::new;
use rstest::fixture;
use std::path::{Path, PathBuf};

/// A listing file living in its own temporary directory
#[derive(new)]
pub struct ListingFile {
    dir: TempDir,
    path: PathBuf,
}

impl ListingFile {
    pub fn write(content: &str) -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let file = dir.child("history.txt");
        file.write_str(content).expect("Failed to write listing");
        let path = file.path().to_path_buf();

        ListingFile::new(dir, path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }
}

/// ```text
///        r0 (tag: v0.1)
///       /  \
///     a1    b1
///     |     |
///     a2    b2
///   (main) (feature)
/// ```
#[fixture]
pub fn converging_branches() -> ListingFile {
    ListingFile::write(
        "# two branches forked from the initial commit\n\
         commit a2 a1 | Second on main\n\
         commit b2 b1 | Second on feature\n\
         commit a1 r0 | First on main\n\
         commit b1 r0 | First on feature\n\
         commit r0 | Initial commit\n\
         branch main a2 current\n\
         branch feature b2 parent=main\n\
         tag v0.1 r0\n",
    )
}

/// ```text
///   x0 - x1 (main)     y0 - y1 (origin/pages)
/// ```
#[fixture]
pub fn disjoint_branches() -> ListingFile {
    ListingFile::write(
        "commit x1 x0 | Main work\n\
         commit y1 y0 | Pages work\n\
         commit x0 | Main root\n\
         commit y0 | Pages root\n\
         branch main x1 current\n\
         branch pages y1 remote=origin\n",
    )
}

/// ```text
///   D ── C ── x2 ── x1 ── X (xs)
///   │     \
///   │      y3 ── y2 ── y1
///   │                   \
///   └──────────────────── Y (ys)
/// ```
///
/// `Y` merges the root `D` back in, so a breadth-first search from both tips
/// meets at `D` before it meets at `C`.
#[fixture]
pub fn late_merge() -> ListingFile {
    ListingFile::write(
        "commit X x1 | Tip of xs\n\
         commit Y y1 D | Merge the root into ys\n\
         commit x1 x2 | Second on xs\n\
         commit y1 y2 | Third on ys\n\
         commit x2 C | First on xs\n\
         commit y2 y3 | Second on ys\n\
         commit y3 C | First on ys\n\
         commit C D | Common work\n\
         commit D | Initial commit\n\
         branch xs X current\n\
         branch ys Y\n",
    )
}

/// Parents listed before their children
#[fixture]
pub fn unordered_listing() -> ListingFile {
    ListingFile::write(
        "commit r0 | Initial commit\n\
         commit a1 r0 | Next\n\
         branch main a1 current\n",
    )
}
