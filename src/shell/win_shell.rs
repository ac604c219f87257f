//! Windows Shell thumbnail backend
//!
//! Resolves paths with `SHCreateItemFromParsingName`, asks the item's
//! `IShellItemImageFactory` for a cache-only thumbnail and copies the
//! returned `HBITMAP` into a [`ThumbnailBitmap`] with `GetDIBits`.

use crate::core::error::{Result, ThumbnailError};
use crate::shell::bitmap::{ThumbnailBitmap, BYTES_PER_PIXEL};
use crate::shell::traits::{RenderOptions, ShellProviderTrait, ThumbnailSize, ThumbnailSource};
use log::{debug, trace, warn};
use std::ffi::c_void;
use std::os::windows::ffi::OsStrExt;
use std::path::Path;
use windows::{
    core::{Interface, PCWSTR},
    Win32::{
        Foundation::{RPC_E_CHANGED_MODE, SIZE},
        Graphics::Gdi::{
            CreateCompatibleDC, DeleteDC, DeleteObject, GetDIBits, GetObjectW, BITMAP,
            BITMAPINFO, BITMAPINFOHEADER, BI_RGB, DIB_RGB_COLORS, HBITMAP, HDC, HGDIOBJ,
        },
        System::Com::{
            CoInitializeEx, CoUninitialize, COINIT_APARTMENTTHREADED,
            COINIT_DISABLE_OLE1DDE,
        },
        UI::Shell::{
            IShellItem, IShellItemImageFactory, SHCreateItemFromParsingName, SIIGBF,
            SIIGBF_THUMBNAILONLY,
        },
    },
};

/// RAII guard for COM initialization
///
/// COM keeps a per-thread reference count, so nested guards are fine. When
/// the thread already runs in a different apartment the guard leaves COM
/// alone and does not uninitialize on drop.
pub struct ComGuard {
    initialized: bool,
}

impl ComGuard {
    /// Initialize COM for the current thread (single-threaded apartment)
    pub fn new() -> Result<Self> {
        unsafe {
            let hr = CoInitializeEx(None, COINIT_APARTMENTTHREADED | COINIT_DISABLE_OLE1DDE);

            if hr == RPC_E_CHANGED_MODE {
                trace!("COM already initialized in another apartment");
                return Ok(Self { initialized: false });
            }

            hr.ok().map_err(|e| {
                ThumbnailError::ComError(format!("Failed to initialize COM: {}", e))
            })?;

            Ok(Self { initialized: true })
        }
    }
}

impl Drop for ComGuard {
    fn drop(&mut self) {
        if self.initialized {
            unsafe {
                CoUninitialize();
            }
        }
    }
}

/// Initialize COM and return a guard that will uninitialize on drop
pub fn initialize_com() -> Result<ComGuard> {
    ComGuard::new()
}

/// A resolved shell item ready to produce thumbnails
pub struct WindowsShellItem {
    // Declared before `_com` so the interface is released first.
    factory: IShellItemImageFactory,
    path: String,
    _com: ComGuard,
}

/// Shell thumbnail provider backed by the Windows Shell
#[derive(Debug, Default, Clone, Copy)]
pub struct WindowsShell;

impl WindowsShell {
    pub fn new() -> Self {
        Self
    }
}

impl ShellProviderTrait for WindowsShell {
    type Item = WindowsShellItem;

    fn resolve_shell_item(&self, path: &Path) -> Result<Self::Item> {
        let com = ComGuard::new()?;
        let display = path.display().to_string();
        let wide: Vec<u16> = path
            .as_os_str()
            .encode_wide()
            .chain(std::iter::once(0))
            .collect();

        unsafe {
            let item: IShellItem =
                SHCreateItemFromParsingName(PCWSTR(wide.as_ptr()), None).map_err(
                    |e| ThumbnailError::PathNotResolved {
                        path: display.clone(),
                        message: e.to_string(),
                    },
                )?;

            let factory: IShellItemImageFactory = item.cast().map_err(|e| {
                debug!("QueryInterface(IShellItemImageFactory) failed: {}", e);
                ThumbnailError::ImageFactoryUnavailable(display.clone())
            })?;

            Ok(WindowsShellItem {
                factory,
                path: display,
                _com: com,
            })
        }
    }

    fn render_thumbnail(
        &self,
        item: &Self::Item,
        size: ThumbnailSize,
        options: RenderOptions,
    ) -> Result<ThumbnailBitmap> {
        let requested = SIZE {
            cx: to_i32(size.width)?,
            cy: to_i32(size.height)?,
        };

        let hbitmap = unsafe { item.factory.GetImage(requested, image_flags(options)) }
            .map_err(|e| {
                debug!("GetImage({}) for '{}' failed: {}", size, item.path, e);
                ThumbnailError::NoCachedThumbnail(item.path.clone())
            })?;

        if hbitmap.is_invalid() {
            return Err(ThumbnailError::NoCachedThumbnail(item.path.clone()));
        }

        let bitmap = OwnedBitmap(hbitmap);
        bitmap.read_pixels()
    }

    fn name(&self) -> &'static str {
        "windows-shell"
    }
}

fn image_flags(options: RenderOptions) -> SIIGBF {
    match options.source {
        ThumbnailSource::CacheOnly => SIIGBF_THUMBNAILONLY,
    }
}

fn to_i32(value: u32) -> Result<i32> {
    i32::try_from(value)
        .map_err(|_| ThumbnailError::RenderFailed(format!("size {} out of range", value)))
}

/// An `HBITMAP` we own and must delete
struct OwnedBitmap(HBITMAP);

impl OwnedBitmap {
    fn gdi_object(&self) -> HGDIOBJ {
        self.0.into()
    }

    /// Copy the bitmap into a top-down 32-bit BGRA buffer
    fn read_pixels(&self) -> Result<ThumbnailBitmap> {
        unsafe {
            let mut info = BITMAP::default();
            let written = GetObjectW(
                self.gdi_object(),
                std::mem::size_of::<BITMAP>() as i32,
                Some(&mut info as *mut BITMAP as *mut c_void),
            );
            if written == 0 {
                return Err(ThumbnailError::RenderFailed(
                    "GetObjectW returned no bitmap info".to_string(),
                ));
            }

            let width = info.bmWidth;
            let height = info.bmHeight.abs();
            if width <= 0 || height == 0 {
                return Err(ThumbnailError::RenderFailed(format!(
                    "empty bitmap ({}x{})",
                    width, height
                )));
            }

            let mut header = BITMAPINFO::default();
            header.bmiHeader = BITMAPINFOHEADER {
                biSize: std::mem::size_of::<BITMAPINFOHEADER>() as u32,
                biWidth: width,
                // Negative height asks for top-down rows
                biHeight: -height,
                biPlanes: 1,
                biBitCount: 32,
                biCompression: BI_RGB.0,
                ..Default::default()
            };

            let mut pixels = vec![0u8; width as usize * height as usize * BYTES_PER_PIXEL];

            let hdc = CreateCompatibleDC(HDC::default());
            if hdc.is_invalid() {
                return Err(ThumbnailError::RenderFailed(
                    "CreateCompatibleDC failed".to_string(),
                ));
            }

            let lines = GetDIBits(
                hdc,
                self.0,
                0,
                height as u32,
                Some(pixels.as_mut_ptr() as *mut c_void),
                &mut header,
                DIB_RGB_COLORS,
            );
            let _ = DeleteDC(hdc);

            if lines == 0 {
                return Err(ThumbnailError::RenderFailed("GetDIBits failed".to_string()));
            }

            ThumbnailBitmap::from_bgra(width as u32, height as u32, pixels)
        }
    }
}

impl Drop for OwnedBitmap {
    fn drop(&mut self) {
        unsafe {
            if !DeleteObject(self.gdi_object()).as_bool() {
                warn!("DeleteObject failed for thumbnail bitmap");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_com_guard_nests() {
        let outer = ComGuard::new().unwrap();
        let inner = ComGuard::new().unwrap();
        drop(inner);
        drop(outer);
    }

    #[test]
    fn test_missing_path_does_not_resolve() {
        let shell = WindowsShell::new();
        let result = shell.resolve_shell_item(Path::new(r"C:\definitely\not\here\missing.jpg"));
        assert!(matches!(
            result,
            Err(ThumbnailError::PathNotResolved { .. })
        ));
    }

    #[test]
    fn test_size_out_of_range() {
        assert!(to_i32(u32::MAX).is_err());
        assert_eq!(to_i32(256).unwrap(), 256);
    }
}
