//! 进度与状态通知接口。
//!
//! 核心逻辑从不持有 UI 控件引用，批量操作只通过 `Progress` 回调向宿主汇报：
//! 每处理完一项调用一次 `on_progress`，阶段开始/结束时调用 `on_status`。
//! 回调中不得修改正在汇报的牌组。

/// 宿主实现的进度回调，两个方法都有空的默认实现。
pub trait Progress {
    fn on_progress(&mut self, _completed: usize, _total: usize) {}

    fn on_status(&mut self, _message: &str) {}
}

/// 不做任何事。
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl Progress for Silent {}

/// 转发到 `log`，供命令行宿主使用。
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl Progress for LogProgress {
    fn on_progress(&mut self, completed: usize, total: usize) {
        log::debug!("进度 {}/{}", completed, total);
    }

    fn on_status(&mut self, message: &str) {
        log::info!("{}", message);
    }
}
