//! # Pool de Threads
//! src/pool/thread_pool.rs
//!
//! Un número fijo de workers consume tareas de una cola FIFO compartida,
//! protegida por un único `Mutex` + `Condvar`.
//!
//! ## Ciclo de vida de un worker
//!
//! ```text
//! WAITING ⇄ RUNNING → EXITED
//! ```
//!
//! - WAITING: duerme en la condvar mientras la cola está vacía
//! - RUNNING: ejecuta una tarea fuera del lock
//! - EXITED: se pidió shutdown y la cola ya está vacía
//!
//! Una tarea que hace panic no mata al worker: se captura con
//! `catch_unwind`, se registra y el worker vuelve a la cola.

use crate::error::PoolError;
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use tracing::{debug, error, info};

/// Una unidad de trabajo para el pool
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Estado protegido por el mutex
struct QueueState {
    tasks: VecDeque<Task>,
    shutting_down: bool,
}

/// Cola compartida entre el pool y sus workers
struct SharedQueue {
    state: Mutex<QueueState>,
    available: Condvar,
}

impl SharedQueue {
    fn new() -> Self {
        Self {
            state: Mutex::new(QueueState {
                tasks: VecDeque::new(),
                shutting_down: false,
            }),
            available: Condvar::new(),
        }
    }

    /// Toma el lock; las tareas corren fuera de él, así que un mutex
    /// envenenado no puede dejar la cola a medias y se recupera
    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Bloquea hasta que haya una tarea; `None` cuando hay que salir
    fn next_task(&self) -> Option<Task> {
        let mut state = self.lock();

        loop {
            if let Some(task) = state.tasks.pop_front() {
                return Some(task);
            }

            if state.shutting_down {
                return None;
            }

            state = self
                .available
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }
}

/// Un thread del pool
struct Worker {
    id: usize,
    handle: Option<JoinHandle<()>>,
}

/// Pool de tamaño fijo
///
/// # Ejemplo
/// ```
/// use search_server::pool::ThreadPool;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
///
/// let counter = Arc::new(AtomicUsize::new(0));
/// let mut pool = ThreadPool::new(2).unwrap();
/// for _ in 0..10 {
///     let counter = Arc::clone(&counter);
///     pool.dispatch(move || {
///         counter.fetch_add(1, Ordering::SeqCst);
///     })
///     .unwrap();
/// }
/// pool.shutdown();
/// assert_eq!(counter.load(Ordering::SeqCst), 10);
/// ```
pub struct ThreadPool {
    queue: Arc<SharedQueue>,
    workers: Vec<Worker>,
}

impl ThreadPool {
    /// Crea el pool y lanza `num_threads` workers
    ///
    /// Si el sistema no puede crear algún thread, los workers que ya
    /// arrancaron se detienen y se retorna el error.
    pub fn new(num_threads: usize) -> Result<Self, PoolError> {
        if num_threads == 0 {
            return Err(PoolError::NoWorkers);
        }

        let mut pool = Self {
            queue: Arc::new(SharedQueue::new()),
            workers: Vec::with_capacity(num_threads),
        };

        // Si un spawn falla, `?` destruye `pool` y Drop detiene a los demás
        for id in 0..num_threads {
            let queue = Arc::clone(&pool.queue);
            let handle = thread::Builder::new()
                .name(format!("search-worker-{}", id))
                .spawn(move || worker_loop(id, queue))
                .map_err(|source| PoolError::Spawn { index: id, source })?;

            pool.workers.push(Worker {
                id,
                handle: Some(handle),
            });
        }

        info!(workers = num_threads, "Pool de threads iniciado");
        Ok(pool)
    }

    /// Encola una tarea y retorna de inmediato
    pub fn dispatch<F>(&self, task: F) -> Result<(), PoolError>
    where
        F: FnOnce() + Send + 'static,
    {
        let mut state = self.queue.lock();
        if state.shutting_down {
            return Err(PoolError::ShutDown);
        }

        state.tasks.push_back(Box::new(task));
        drop(state);

        self.queue.available.notify_one();
        Ok(())
    }

    /// Número de workers
    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Tareas esperando en la cola (sin contar las que están corriendo)
    pub fn queued(&self) -> usize {
        self.queue.lock().tasks.len()
    }

    /// Vista de solo lectura del pool, para reportar su estado desde las
    /// mismas tareas que corren en él
    pub fn monitor(&self) -> PoolMonitor {
        PoolMonitor {
            size: self.workers.len(),
            queue: Arc::clone(&self.queue),
        }
    }

    /// Pide a los workers que terminen y espera a que salgan
    ///
    /// Los workers vacían la cola antes de salir. Llamarla más de una vez
    /// no tiene efecto.
    pub fn shutdown(&mut self) {
        {
            let mut state = self.queue.lock();
            if state.shutting_down && self.workers.iter().all(|w| w.handle.is_none()) {
                return;
            }
            state.shutting_down = true;
        }
        self.queue.available.notify_all();

        for worker in &mut self.workers {
            if let Some(handle) = worker.handle.take() {
                if handle.join().is_err() {
                    error!(worker = worker.id, "El worker terminó con panic");
                }
            }
        }

        info!("Pool de threads detenido");
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Tamaño y cola de un `ThreadPool`
#[derive(Clone)]
pub struct PoolMonitor {
    size: usize,
    queue: Arc<SharedQueue>,
}

impl PoolMonitor {
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn queued(&self) -> usize {
        self.queue.lock().tasks.len()
    }
}

/// Loop principal de cada worker
fn worker_loop(id: usize, queue: Arc<SharedQueue>) {
    debug!(worker = id, "Worker iniciado");

    while let Some(task) = queue.next_task() {
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(task)) {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            error!(worker = id, panic = %message, "La tarea hizo panic; el worker sigue");
        }
    }

    debug!(worker = id, "Worker terminado");
}
