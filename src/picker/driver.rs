// 选择器驱动
//
// 把状态机产出的命令落到真实副作用上：列表/搜索/转存走 PickerBackend，
// 防抖用 tokio 计时器，完成通知经由事件队列回灌状态机。
// 单个 mpsc 队列保证事件串行处理，状态机无需加锁

use crate::picker::backend::PickerBackend;
use crate::picker::state::{Command, Event, PickerState, SEARCH_DEBOUNCE};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

/// 选择回调
pub type SelectCallback = Box<dyn FnMut(String) + Send>;

/// 选择器驱动
pub struct PickerDriver<B: PickerBackend + 'static> {
    /// 状态机
    state: PickerState,
    /// 代理端点后端
    backend: Arc<B>,
    /// 目标房源ID
    property_id: String,
    /// 完成事件入口（交给派生任务）
    events_tx: mpsc::UnboundedSender<Event>,
    /// 完成事件出口
    events_rx: mpsc::UnboundedReceiver<Event>,
    /// 选择回调，收到公开地址时调用
    on_select: SelectCallback,
}

impl<B: PickerBackend + 'static> PickerDriver<B> {
    /// 创建新的选择器驱动
    ///
    /// # 参数
    /// * `backend` - 代理端点后端
    /// * `property_id` - 转存目标房源ID
    /// * `on_select` - 选择回调
    pub fn new(
        backend: Arc<B>,
        property_id: impl Into<String>,
        on_select: impl FnMut(String) + Send + 'static,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            state: PickerState::new(),
            backend,
            property_id: property_id.into(),
            events_tx,
            events_rx,
            on_select: Box::new(on_select),
        }
    }

    /// 当前状态（只读）
    pub fn state(&self) -> &PickerState {
        &self.state
    }

    /// 注入一个事件并执行其产生的全部命令
    pub fn dispatch(&mut self, event: Event) {
        let commands = self.state.handle(event);
        for command in commands {
            self.execute(command);
        }
    }

    /// 等待下一个完成事件并处理，队列关闭时返回 false
    pub async fn next_event(&mut self) -> bool {
        match self.events_rx.recv().await {
            Some(event) => {
                self.dispatch(event);
                true
            }
            None => false,
        }
    }

    /// 处理所有已到达的完成事件，不等待
    pub fn pump(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            self.dispatch(event);
        }
    }

    fn execute(&mut self, command: Command) {
        debug!("执行命令: {:?}", command);
        match command {
            Command::FetchListing {
                folder_id,
                generation,
            } => {
                let backend = Arc::clone(&self.backend);
                let tx = self.events_tx.clone();
                tokio::spawn(async move {
                    let result = backend
                        .list(folder_id.as_deref())
                        .await
                        .map_err(|e| format!("{:#}", e));
                    let _ = tx.send(Event::FetchDone { generation, result });
                });
            }
            Command::FetchSearch { query, generation } => {
                let backend = Arc::clone(&self.backend);
                let tx = self.events_tx.clone();
                tokio::spawn(async move {
                    let result = backend
                        .search(&query)
                        .await
                        .map_err(|e| format!("{:#}", e));
                    let _ = tx.send(Event::FetchDone { generation, result });
                });
            }
            Command::ScheduleDebounce { token } => {
                let tx = self.events_tx.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(SEARCH_DEBOUNCE).await;
                    let _ = tx.send(Event::DebounceFired(token));
                });
            }
            Command::StartUpload { file_id } => {
                let backend = Arc::clone(&self.backend);
                let property_id = self.property_id.clone();
                let tx = self.events_tx.clone();
                tokio::spawn(async move {
                    let result = backend
                        .upload(&file_id, &property_id)
                        .await
                        .map_err(|e| format!("{:#}", e));
                    let _ = tx.send(Event::UploadDone { file_id, result });
                });
            }
            Command::EmitSelected { url } => {
                (self.on_select)(url);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drive::DriveEntry;
    use crate::picker::state::PickerMode;
    use anyhow::Result;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// 内存后端：固定数据，记录调用
    #[derive(Default)]
    struct FakeBackend {
        entries: Vec<DriveEntry>,
        search_calls: Mutex<Vec<String>>,
        list_calls: AtomicUsize,
        upload_calls: Mutex<Vec<(String, String)>>,
    }

    fn image(id: &str, name: &str) -> DriveEntry {
        DriveEntry {
            id: id.to_string(),
            name: name.to_string(),
            mime_type: "image/jpeg".to_string(),
            thumbnail_link: None,
        }
    }

    #[async_trait]
    impl PickerBackend for FakeBackend {
        async fn list(&self, _folder_id: Option<&str>) -> Result<Vec<DriveEntry>> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.entries.clone())
        }

        async fn search(&self, text: &str) -> Result<Vec<DriveEntry>> {
            self.search_calls.lock().unwrap().push(text.to_string());
            Ok(self.entries.clone())
        }

        async fn upload(&self, file_id: &str, property_id: &str) -> Result<String> {
            self.upload_calls
                .lock()
                .unwrap()
                .push((file_id.to_string(), property_id.to_string()));
            Ok(format!("https://cdn.example.com/{}.jpg", file_id))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_loads_root_listing() {
        let backend = Arc::new(FakeBackend {
            entries: vec![image("i1", "a.jpg")],
            ..Default::default()
        });
        let mut driver = PickerDriver::new(backend.clone(), "p1", |_| {});

        driver.dispatch(Event::Open);
        assert!(driver.state().is_loading());

        assert!(driver.next_event().await);
        assert!(!driver.state().is_loading());
        assert_eq!(driver.state().entries().len(), 1);
        assert_eq!(backend.list_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_typing_issues_single_search() {
        let backend = Arc::new(FakeBackend {
            entries: vec![image("i1", "beach.jpg")],
            ..Default::default()
        });
        let mut driver = PickerDriver::new(backend.clone(), "p1", |_| {});

        driver.dispatch(Event::Open);
        assert!(driver.next_event().await); // 根目录加载完成
        driver.dispatch(Event::SwitchMode(PickerMode::Search));

        // 三次键入都落在静默期内，只有最后一个计时器有效
        driver.dispatch(Event::QueryChanged("b".to_string()));
        driver.dispatch(Event::QueryChanged("be".to_string()));
        driver.dispatch(Event::QueryChanged("bea".to_string()));

        // 三个计时器都会到期，其中两个已作废；有效的那个触发搜索及其完成事件
        for _ in 0..4 {
            assert!(driver.next_event().await);
        }

        let calls = backend.search_calls.lock().unwrap();
        assert_eq!(calls.as_slice(), ["bea"]);
        drop(calls);
        assert_eq!(driver.state().entries().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_select_image_uploads_and_emits_url() {
        let backend = Arc::new(FakeBackend {
            entries: vec![image("i1", "a.jpg")],
            ..Default::default()
        });
        let selected = Arc::new(Mutex::new(None::<String>));
        let selected_clone = Arc::clone(&selected);
        let mut driver = PickerDriver::new(backend.clone(), "p1", move |url| {
            *selected_clone.lock().unwrap() = Some(url);
        });

        driver.dispatch(Event::Open);
        assert!(driver.next_event().await);

        driver.dispatch(Event::SelectImage("i1".to_string()));
        assert_eq!(driver.state().uploading(), Some("i1"));

        assert!(driver.next_event().await); // 转存完成

        // 回调收到公开地址，选择器关闭
        assert_eq!(
            selected.lock().unwrap().as_deref(),
            Some("https://cdn.example.com/i1.jpg")
        );
        assert!(!driver.state().is_open());

        // 转存请求带上了房源ID
        let uploads = backend.upload_calls.lock().unwrap();
        assert_eq!(uploads.as_slice(), [("i1".to_string(), "p1".to_string())]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_query_never_reaches_backend() {
        let backend = Arc::new(FakeBackend::default());
        let mut driver = PickerDriver::new(backend.clone(), "p1", |_| {});

        driver.dispatch(Event::Open);
        assert!(driver.next_event().await);
        driver.dispatch(Event::SwitchMode(PickerMode::Search));

        driver.dispatch(Event::QueryChanged("  ".to_string()));

        // 静默期过后也没有任何搜索请求
        tokio::time::sleep(SEARCH_DEBOUNCE * 2).await;
        driver.pump();
        assert!(backend.search_calls.lock().unwrap().is_empty());
    }
}
