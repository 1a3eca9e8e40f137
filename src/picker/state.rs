// 选择器状态机
//
// 状态只通过 handle 的显式转移修改，所有副作用以命令的形式交给驱动执行。
// 每次列表/搜索请求携带单调递增的代数，迟到的响应代数对不上就丢弃，
// 防抖计时器用同样的办法作废

use crate::drive::DriveEntry;
use std::time::Duration;

/// 搜索防抖静默期
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(400);

/// 选择器模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerMode {
    /// 按文件夹浏览
    Browse,
    /// 全盘搜索
    Search,
}

/// 面包屑条目
///
/// 面包屑栈记录从根到当前文件夹的路径，根即空栈
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crumb {
    /// 文件夹ID
    pub id: String,
    /// 文件夹名
    pub name: String,
}

/// 输入事件（用户操作与异步完成通知）
#[derive(Debug, Clone)]
pub enum Event {
    /// 打开选择器
    Open,
    /// 关闭选择器（显式关闭或点击遮罩）
    Close,
    /// 切换模式
    SwitchMode(PickerMode),
    /// 进入文件夹
    EnterFolder { id: String, name: String },
    /// 跳转到面包屑位置（0 表示根）
    JumpTo(usize),
    /// 搜索框文本变化
    QueryChanged(String),
    /// 防抖计时器到期
    DebounceFired(u64),
    /// 选择图片
    SelectImage(String),
    /// 消除错误横幅
    DismissError,
    /// 列表/搜索请求完成
    FetchDone {
        generation: u64,
        result: Result<Vec<DriveEntry>, String>,
    },
    /// 转存请求完成
    UploadDone {
        file_id: String,
        result: Result<String, String>,
    },
}

/// 输出命令（由驱动执行的副作用）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// 拉取文件夹列表（None 表示根）
    FetchListing {
        folder_id: Option<String>,
        generation: u64,
    },
    /// 发起搜索
    FetchSearch { query: String, generation: u64 },
    /// 重启防抖计时器
    ScheduleDebounce { token: u64 },
    /// 发起转存
    StartUpload { file_id: String },
    /// 把公开地址交给选择回调
    EmitSelected { url: String },
}

/// 选择器状态
#[derive(Debug)]
pub struct PickerState {
    /// 是否打开
    open: bool,
    /// 当前模式
    mode: PickerMode,
    /// 面包屑栈
    breadcrumb: Vec<Crumb>,
    /// 当前展示的条目
    entries: Vec<DriveEntry>,
    /// 是否有列表/搜索请求进行中
    loading: bool,
    /// 错误信息（横幅展示，可消除）
    error: Option<String>,
    /// 转存中的图片ID
    uploading: Option<String>,
    /// 搜索框文本
    query: String,
    /// 列表/搜索请求代数
    generation: u64,
    /// 防抖计时器令牌
    debounce_token: u64,
}

impl PickerState {
    /// 创建关闭状态的选择器
    pub fn new() -> Self {
        Self {
            open: false,
            mode: PickerMode::Browse,
            breadcrumb: Vec::new(),
            entries: Vec::new(),
            loading: false,
            error: None,
            uploading: None,
            query: String::new(),
            generation: 0,
            debounce_token: 0,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn mode(&self) -> PickerMode {
        self.mode
    }

    pub fn breadcrumb(&self) -> &[Crumb] {
        &self.breadcrumb
    }

    pub fn entries(&self) -> &[DriveEntry] {
        &self.entries
    }

    /// 当前条目中的文件夹（浏览视图里排在图片之前）
    pub fn folders(&self) -> Vec<&DriveEntry> {
        self.entries.iter().filter(|e| e.is_folder()).collect()
    }

    /// 当前条目中的图片
    pub fn images(&self) -> Vec<&DriveEntry> {
        self.entries.iter().filter(|e| !e.is_folder()).collect()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn uploading(&self) -> Option<&str> {
        self.uploading.as_deref()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// 处理一个事件，返回需要执行的命令
    pub fn handle(&mut self, event: Event) -> Vec<Command> {
        match event {
            Event::Open => self.on_open(),
            Event::Close => {
                self.reset_transient();
                Vec::new()
            }
            Event::SwitchMode(mode) => self.on_switch_mode(mode),
            Event::EnterFolder { id, name } => self.on_enter_folder(id, name),
            Event::JumpTo(index) => self.on_jump_to(index),
            Event::QueryChanged(text) => self.on_query_changed(text),
            Event::DebounceFired(token) => self.on_debounce_fired(token),
            Event::SelectImage(file_id) => self.on_select_image(file_id),
            Event::DismissError => {
                self.error = None;
                Vec::new()
            }
            Event::FetchDone { generation, result } => self.on_fetch_done(generation, result),
            Event::UploadDone { file_id, result } => self.on_upload_done(file_id, result),
        }
    }

    fn on_open(&mut self) -> Vec<Command> {
        if self.open {
            return Vec::new();
        }
        // 重新打开不记忆上次的导航位置，始终从浏览模式的根开始
        self.reset_transient();
        self.open = true;
        self.begin_listing_fetch()
    }

    fn on_switch_mode(&mut self, mode: PickerMode) -> Vec<Command> {
        if !self.open || mode == self.mode {
            return Vec::new();
        }
        self.mode = mode;
        self.entries.clear();
        self.error = None;
        match mode {
            // 切回浏览时按当前面包屑位置重新拉取
            PickerMode::Browse => self.begin_listing_fetch(),
            // 切到搜索只等待输入，不自动发起请求
            PickerMode::Search => {
                self.query.clear();
                self.debounce_token += 1;
                self.loading = false;
                Vec::new()
            }
        }
    }

    fn on_enter_folder(&mut self, id: String, name: String) -> Vec<Command> {
        if !self.open || self.mode != PickerMode::Browse {
            return Vec::new();
        }
        self.breadcrumb.push(Crumb { id, name });
        self.begin_listing_fetch()
    }

    fn on_jump_to(&mut self, index: usize) -> Vec<Command> {
        if !self.open || self.mode != PickerMode::Browse || index > self.breadcrumb.len() {
            return Vec::new();
        }
        self.breadcrumb.truncate(index);
        self.begin_listing_fetch()
    }

    fn on_query_changed(&mut self, text: String) -> Vec<Command> {
        if !self.open || self.mode != PickerMode::Search {
            return Vec::new();
        }
        self.query = text;
        // 每次键入都作废上一个计时器
        self.debounce_token += 1;
        if self.query.trim().is_empty() {
            // 空白查询立即清空结果，不发请求
            self.entries.clear();
            self.loading = false;
            Vec::new()
        } else {
            vec![Command::ScheduleDebounce {
                token: self.debounce_token,
            }]
        }
    }

    fn on_debounce_fired(&mut self, token: u64) -> Vec<Command> {
        if !self.open || self.mode != PickerMode::Search || token != self.debounce_token {
            return Vec::new();
        }
        if self.query.trim().is_empty() {
            return Vec::new();
        }
        self.generation += 1;
        self.loading = true;
        self.error = None;
        vec![Command::FetchSearch {
            query: self.query.clone(),
            generation: self.generation,
        }]
    }

    fn on_select_image(&mut self, file_id: String) -> Vec<Command> {
        if !self.open {
            return Vec::new();
        }
        // 已有转存进行中时所有图片惰性，避免并发重复选择
        if self.uploading.is_some() {
            return Vec::new();
        }
        self.uploading = Some(file_id.clone());
        self.error = None;
        vec![Command::StartUpload { file_id }]
    }

    fn on_fetch_done(
        &mut self,
        generation: u64,
        result: Result<Vec<DriveEntry>, String>,
    ) -> Vec<Command> {
        // 代数对不上说明已有更新的请求，丢弃迟到的响应
        if !self.open || generation != self.generation {
            return Vec::new();
        }
        self.loading = false;
        match result {
            Ok(files) => self.entries = files,
            Err(message) => self.error = Some(message),
        }
        Vec::new()
    }

    fn on_upload_done(&mut self, file_id: String, result: Result<String, String>) -> Vec<Command> {
        if self.uploading.as_deref() != Some(file_id.as_str()) {
            return Vec::new();
        }
        self.uploading = None;
        match result {
            Ok(url) => {
                // 成功后交出公开地址并关闭选择器
                self.reset_transient();
                vec![Command::EmitSelected { url }]
            }
            Err(message) => {
                self.error = Some(message);
                Vec::new()
            }
        }
    }

    /// 发起一次按面包屑定位的列表拉取
    fn begin_listing_fetch(&mut self) -> Vec<Command> {
        self.generation += 1;
        self.loading = true;
        self.error = None;
        let folder_id = self.breadcrumb.last().map(|crumb| crumb.id.clone());
        vec![Command::FetchListing {
            folder_id,
            generation: self.generation,
        }]
    }

    /// 丢弃全部瞬时状态
    ///
    /// 代数和防抖令牌跨越开合保持单调，避免重开后旧计时器或旧响应撞号
    fn reset_transient(&mut self) {
        self.open = false;
        self.mode = PickerMode::Browse;
        self.breadcrumb.clear();
        self.entries.clear();
        self.loading = false;
        self.error = None;
        self.uploading = None;
        self.query.clear();
    }
}

impl Default for PickerState {
    fn default() -> Self {
        Self::new()
    }
}
