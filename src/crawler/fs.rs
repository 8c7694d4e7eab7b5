//! # Acceso al Sistema de Archivos
//! src/crawler/fs.rs
//!
//! El crawler no toca `std::fs` directamente: usa el trait `FileSystem`,
//! que expone solo las dos operaciones que necesita (leer un archivo y
//! listar un directorio). Así los tests pueden simular errores de lectura
//! que son difíciles de provocar en un disco real.

use std::fs;
use std::io;
use std::path::Path;

/// Una entrada de directorio: archivo regular o subdirectorio
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub is_dir: bool,
}

impl DirEntry {
    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_dir: false,
        }
    }

    pub fn dir(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_dir: true,
        }
    }
}

/// Operaciones de archivos que usa el crawler
pub trait FileSystem {
    /// Lee el contenido completo de un archivo
    fn read_file(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Lista un directorio
    ///
    /// Solo incluye archivos regulares y subdirectorios, ordenados por
    /// nombre. Falla si `path` no existe o no es un directorio.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>>;
}

/// Implementación sobre el disco local
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFs;

impl FileSystem for LocalFs {
    fn read_file(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        let mut entries = Vec::new();

        for entry in fs::read_dir(path)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();

            // `fs::metadata` sigue symlinks, igual que stat(2)
            let Ok(metadata) = fs::metadata(entry.path()) else {
                continue;
            };

            if metadata.is_dir() {
                entries.push(DirEntry::dir(name));
            } else if metadata.is_file() {
                entries.push(DirEntry::file(name));
            }
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }
}
