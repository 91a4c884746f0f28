//! 撤销 / 重做历史。
//!
//! # 设计思路
//!
//! 以组合而非继承的方式提供快照能力：持有方（如 `Session`）内嵌一个
//! `History<T>`，在每次成功修改后调用 `track` 保存深拷贝。
//!
//! # 实现思路
//!
//! - 第一个快照为初始状态，永远不会被撤销掉。
//! - `track` 会丢弃当前位置之后的重做分支，再追加新快照。
//! - 超过 `depth` 时丢弃最旧的快照。
//! - `undo` / `redo` 返回选中快照的深拷贝，历史本身保持不变。

use std::collections::VecDeque;

#[derive(Debug, Clone)]
struct Snapshot<T> {
    value: T,
    message: String,
}

/// 带容量上限的快照历史。
#[derive(Debug, Clone)]
pub struct History<T: Clone> {
    states: VecDeque<Snapshot<T>>,
    cursor: usize,
    depth: usize,
}

impl<T: Clone> History<T> {
    pub const INITIAL_MESSAGE: &'static str = "初始状态";

    pub fn new(initial: &T, depth: usize) -> Self {
        let mut states = VecDeque::new();
        states.push_back(Snapshot {
            value: initial.clone(),
            message: Self::INITIAL_MESSAGE.to_string(),
        });
        Self {
            states,
            cursor: 0,
            depth: depth.max(1),
        }
    }

    /// 在当前位置之后记录一个新快照。
    pub fn track(&mut self, value: &T, message: impl Into<String>) {
        self.states.truncate(self.cursor + 1);
        self.states.push_back(Snapshot {
            value: value.clone(),
            message: message.into(),
        });
        while self.states.len() > self.depth {
            self.states.pop_front();
        }
        self.cursor = self.states.len() - 1;
    }

    pub fn undo(&mut self) -> Option<T> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        Some(self.states[self.cursor].value.clone())
    }

    pub fn redo(&mut self) -> Option<T> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        Some(self.states[self.cursor].value.clone())
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.states.len()
    }

    /// 当前快照（最近一次提交或撤销 / 重做到的状态）。
    pub fn current(&self) -> &T {
        &self.states[self.cursor].value
    }

    /// 当前快照的说明文字。
    pub fn current_message(&self) -> &str {
        &self.states[self.cursor].message
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// 以 `value` 作为新的初始状态，清空其余快照。
    pub fn reset(&mut self, value: &T) {
        *self = Self::new(value, self.depth);
    }
}
