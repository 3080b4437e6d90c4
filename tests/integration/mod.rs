pub mod mock_server;

mod http_submit;
