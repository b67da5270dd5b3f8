use crate::models::BitMatrix;
use image::{DynamicImage, GenericImageView, GrayImage};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

fn max_dim_from_env() -> Option<u32> {
    match env::var("FGC_MAX_DIM") {
        Ok(value) => match value.trim().parse::<u32>() {
            Ok(0) => None,
            Ok(v) => Some(v),
            Err(_) => None,
        },
        Err(_) => None,
    }
}

/// Load an image, shrinking it to `FGC_MAX_DIM` on its longer side when set.
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<DynamicImage, image::ImageError> {
    let img = image::open(path)?;
    if let Some(max_dim) = max_dim_from_env() {
        let (w, h) = img.dimensions();
        if w.max(h) > max_dim {
            return Ok(img.resize(max_dim, max_dim, image::imageops::FilterType::Triangle));
        }
    }
    Ok(img)
}

/// Summary statistics for grayscale data.
#[derive(Debug, Clone, Copy)]
pub struct GrayStats {
    /// Minimum grayscale value.
    pub min: u8,
    /// Maximum grayscale value.
    pub max: u8,
    /// Average grayscale value.
    pub avg: u8,
}

/// Summary statistics for a binary matrix.
#[derive(Debug, Clone, Copy)]
pub struct BinaryStats {
    /// Count of ink pixels.
    pub ink_pixels: usize,
    /// Total pixels in the matrix.
    pub total_pixels: usize,
    /// Ratio of ink pixels to total pixels.
    pub ink_ratio: f64,
}

/// Compute min/max/avg for a grayscale image.
pub fn grayscale_stats(gray: &GrayImage) -> GrayStats {
    let mut min = u8::MAX;
    let mut max = u8::MIN;
    let mut sum: u64 = 0;
    for &v in gray.as_raw() {
        min = min.min(v);
        max = max.max(v);
        sum += v as u64;
    }
    let n = gray.as_raw().len();
    let avg = if n == 0 { 0 } else { (sum / n as u64) as u8 };
    GrayStats { min, max, avg }
}

/// Compute ink pixel stats for a binary matrix.
pub fn binary_stats(binary: &BitMatrix) -> BinaryStats {
    let ink = binary.count_ones();
    let total = binary.width() * binary.height();
    let ratio = if total == 0 {
        0.0
    } else {
        ink as f64 / total as f64
    };
    BinaryStats {
        ink_pixels: ink,
        total_pixels: total,
        ink_ratio: ratio,
    }
}

/// Dataset root for benches from `FGC_DATASET_ROOT`.
pub fn dataset_root_from_env() -> Option<PathBuf> {
    env::var("FGC_DATASET_ROOT").ok().map(PathBuf::from)
}

/// Default bench limit from environment variables.
///
/// Returns `None` (full dataset) when `FGC_BENCH_LIMIT` is unset or set to `0`.
pub fn bench_limit_from_env() -> Option<usize> {
    match env::var("FGC_BENCH_LIMIT") {
        Ok(value) => value
            .parse::<usize>()
            .ok()
            .and_then(|v| if v == 0 { None } else { Some(v) }),
        Err(_) => None,
    }
}

/// Iterate image paths under `root` in sorted order, optionally limited.
///
/// A file path yields itself.
pub fn dataset_iter<P: AsRef<Path>>(root: P, limit: Option<usize>) -> impl Iterator<Item = PathBuf> {
    let root = root.as_ref();
    let mut images = if root.is_file() {
        vec![root.to_path_buf()]
    } else {
        collect_images(root)
    };

    images.sort();
    if let Some(limit) = limit {
        images.truncate(limit);
    }
    images.into_iter()
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| matches!(ext.as_str(), "png" | "jpg" | "jpeg" | "gif" | "bmp"))
}

fn collect_images(root: &Path) -> Vec<PathBuf> {
    let mut stack = vec![root.to_path_buf()];
    let mut images = Vec::new();

    while let Some(dir) = stack.pop() {
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(_) => continue,
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
            } else if is_image(&path) {
                images.push(path);
            }
        }
    }

    images
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir() -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let dir = env::temp_dir().join(format!("rust_fgc_tools_{nanos}"));
        fs::create_dir_all(dir.join("nested")).unwrap();
        dir
    }

    #[test]
    fn dataset_iter_finds_nested_images_sorted() {
        let dir = temp_dir();
        for name in ["b.png", "a.JPG", "notes.txt", "nested/c.bmp"] {
            fs::write(dir.join(name), b"x").unwrap();
        }

        let found: Vec<PathBuf> = dataset_iter(&dir, None).collect();
        assert_eq!(found, vec![dir.join("a.JPG"), dir.join("b.png"), dir.join("nested/c.bmp")]);
        assert_eq!(dataset_iter(&dir, Some(1)).count(), 1);
        assert_eq!(
            dataset_iter(dir.join("b.png"), None).collect::<Vec<_>>(),
            vec![dir.join("b.png")]
        );
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn stats_summarize_pixels() {
        let mut gray = GrayImage::from_pixel(2, 2, image::Luma([100]));
        gray.put_pixel(0, 0, image::Luma([0]));
        let stats = grayscale_stats(&gray);
        assert_eq!((stats.min, stats.max, stats.avg), (0, 100, 75));

        let mut mask = BitMatrix::new(2, 2);
        mask.set(1, 1, true);
        let stats = binary_stats(&mask);
        assert_eq!(stats.ink_pixels, 1);
        assert!((stats.ink_ratio - 0.25).abs() < 1e-9);
    }
}
