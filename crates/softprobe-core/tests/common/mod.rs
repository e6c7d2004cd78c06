pub mod soft404_server;
