// src/pipeline/optimistic.rs

/// Estado anterior a uma mutação especulativa. Só pode ser consumido uma vez,
/// por `commit` ou por `rollback`.
#[derive(Debug)]
#[must_use = "um snapshot deve terminar em commit ou rollback"]
pub struct Snapshot<T>(T);

/// Cache local com mutação otimista: snapshot → aplica → commit | rollback.
#[derive(Debug, Clone, Default)]
pub struct OptimisticCache<T> {
    current: T,
}

impl<T: Clone> OptimisticCache<T> {
    pub fn new(initial: T) -> Self {
        Self { current: initial }
    }

    pub fn get(&self) -> &T {
        &self.current
    }

    /// Guarda o estado atual e aplica a mutação imediatamente.
    pub fn apply<F>(&mut self, mutation: F) -> Snapshot<T>
    where
        F: FnOnce(&mut T),
    {
        let snapshot = Snapshot(self.current.clone());
        mutation(&mut self.current);
        snapshot
    }

    /// A requisição deu certo: a mutação fica.
    pub fn commit(&mut self, snapshot: Snapshot<T>) {
        drop(snapshot);
    }

    /// A requisição falhou: volta exatamente ao estado do snapshot.
    pub fn rollback(&mut self, snapshot: Snapshot<T>) {
        self.current = snapshot.0;
    }

    /// Re-sincronização com o servidor.
    pub fn replace(&mut self, value: T) {
        self.current = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rollback_restores_the_exact_snapshot() {
        let mut cache = OptimisticCache::new(vec![1, 2, 3]);

        let snapshot = cache.apply(|v| {
            v[1] = 20;
            v.push(4);
        });
        assert_eq!(cache.get(), &vec![1, 20, 3, 4]);

        cache.rollback(snapshot);
        assert_eq!(cache.get(), &vec![1, 2, 3]);
    }

    #[test]
    fn commit_keeps_the_speculative_value() {
        let mut cache = OptimisticCache::new(String::from("new"));
        let snapshot = cache.apply(|s| *s = "won".into());
        cache.commit(snapshot);
        assert_eq!(cache.get(), "won");

        cache.replace("lost".into());
        assert_eq!(cache.get(), "lost");
    }
}
