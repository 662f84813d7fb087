pub mod litematic;
