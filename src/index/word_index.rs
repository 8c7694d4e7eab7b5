//! # WordIndex
//! src/index/word_index.rs
//!
//! Índice invertido en memoria con búsqueda de una palabra y búsqueda AND
//! de varias palabras. El ranking es la suma de frecuencias.

use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

/// Un documento que coincide con una búsqueda y su ranking
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    /// Identificador del documento (la ruta del archivo)
    pub doc_name: String,

    /// Suma de ocurrencias de los términos buscados en el documento
    pub rank: usize,
}

impl SearchResult {
    pub fn new(doc_name: impl Into<String>, rank: usize) -> Self {
        Self {
            doc_name: doc_name.into(),
            rank,
        }
    }
}

/// Orden de resultados: ranking descendente, nombre ascendente en empates
fn by_rank_then_name(a: &SearchResult, b: &SearchResult) -> Ordering {
    b.rank
        .cmp(&a.rank)
        .then_with(|| a.doc_name.cmp(&b.doc_name))
}

/// Índice invertido: término → (documento → ocurrencias)
///
/// Invariante: ningún término tiene un mapa de postings vacío.
#[derive(Debug, Default, Clone)]
pub struct WordIndex {
    index: HashMap<String, HashMap<String, usize>>,
}

impl WordIndex {
    /// Crea un índice vacío
    pub fn new() -> Self {
        Self::default()
    }

    /// Registra una ocurrencia de `word` en `doc_name`
    ///
    /// El llamador pasa el término ya en minúsculas. Los términos vacíos se
    /// ignoran para no crear entradas inútiles.
    ///
    /// # Ejemplo
    /// ```
    /// use search_server::index::WordIndex;
    ///
    /// let mut index = WordIndex::new();
    /// index.record("dog", "a.txt");
    /// index.record("dog", "a.txt");
    /// assert_eq!(index.lookup_word("dog")[0].rank, 2);
    /// ```
    pub fn record(&mut self, word: &str, doc_name: &str) {
        if word.is_empty() {
            return;
        }

        let postings = self.index.entry(word.to_string()).or_default();
        match postings.get_mut(doc_name) {
            Some(count) => *count += 1,
            None => {
                postings.insert(doc_name.to_string(), 1);
            }
        }
    }

    /// Número de términos distintos en el índice
    pub fn num_words(&self) -> usize {
        self.index.len()
    }

    /// Número de documentos distintos que tienen al menos un término
    pub fn num_documents(&self) -> usize {
        self.index
            .values()
            .flat_map(|postings| postings.keys())
            .collect::<HashSet<_>>()
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Busca los documentos que contienen `word`
    ///
    /// Retorna los pares (documento, ocurrencias) ordenados por ocurrencias
    /// descendente y luego por nombre ascendente. Un término desconocido
    /// produce una lista vacía.
    pub fn lookup_word(&self, word: &str) -> Vec<SearchResult> {
        let Some(postings) = self.index.get(word) else {
            return Vec::new();
        };

        let mut results: Vec<SearchResult> = postings
            .iter()
            .map(|(doc, count)| SearchResult::new(doc.as_str(), *count))
            .collect();
        results.sort_by(by_rank_then_name);
        results
    }

    /// Busca los documentos que contienen TODOS los términos de `query`
    ///
    /// El ranking de cada documento es la suma de las ocurrencias de cada
    /// término en él. Una consulta vacía, o con algún término que no está
    /// en el índice, retorna una lista vacía.
    ///
    /// # Ejemplo
    /// ```
    /// use search_server::index::{SearchResult, WordIndex};
    ///
    /// let mut index = WordIndex::new();
    /// index.record("cat", "a.txt");
    /// index.record("dog", "a.txt");
    /// index.record("dog", "b.txt");
    ///
    /// assert_eq!(
    ///     index.lookup_query(&["cat", "dog"]),
    ///     vec![SearchResult::new("a.txt", 2)]
    /// );
    /// ```
    pub fn lookup_query<S: AsRef<str>>(&self, query: &[S]) -> Vec<SearchResult> {
        if query.is_empty() {
            return Vec::new();
        }

        // Todos los términos deben existir; si falta uno no hay intersección
        let mut postings_lists = Vec::with_capacity(query.len());
        for word in query {
            match self.index.get(word.as_ref()) {
                Some(postings) => postings_lists.push(postings),
                None => return Vec::new(),
            }
        }

        // Empezar por la lista más corta: cada paso recorre solo candidatos
        postings_lists.sort_by_key(|postings| postings.len());

        let mut candidates: HashMap<&str, usize> = postings_lists[0]
            .iter()
            .map(|(doc, count)| (doc.as_str(), *count))
            .collect();

        for postings in &postings_lists[1..] {
            candidates.retain(|doc, rank| match postings.get(*doc) {
                Some(count) => {
                    *rank += count;
                    true
                }
                None => false,
            });

            if candidates.is_empty() {
                return Vec::new();
            }
        }

        let mut results: Vec<SearchResult> = candidates
            .into_iter()
            .map(|(doc, rank)| SearchResult::new(doc, rank))
            .collect();
        results.sort_by(by_rank_then_name);
        results
    }
}
